//! Language strategy interface
//!
//! A strategy turns one syntax tree into UCE entities. The default methods
//! are table driven: they find candidates with the language's [`NodeKinds`]
//! and hand each one to a `parse_*` hook. Languages override the hooks for
//! their field layout, or whole `extract_*` methods when one node can produce
//! several entity kinds (Go `type_spec`, Elixir macro calls).

use super::helpers::{Cx, method, module_level, named_children, visibility_from};
use super::kinds::NodeKinds;
use crate::uce::{
    ClassKind, UceClass, UceExport, UceFunction, UceImport, UceInterface, UceMethod, UceTypeAlias, UceVariable,
    Visibility,
};
use tree_sitter::Node;

pub trait LanguageStrategy: Send + Sync {
    fn kinds(&self) -> &'static NodeKinds;

    /// Visibility of members without an explicit keyword
    fn default_visibility(&self) -> Visibility {
        Visibility::Public
    }

    fn extract_functions(&self, cx: &Cx, root: Node) -> Vec<UceFunction> {
        let kinds = self.kinds();
        module_level(root, kinds.functions, kinds.wrappers)
            .into_iter()
            .filter_map(|n| self.parse_function(cx, n))
            .collect()
    }

    fn extract_classes(&self, cx: &Cx, root: Node) -> Vec<UceClass> {
        let kinds = self.kinds();
        module_level(root, kinds.classes, kinds.wrappers)
            .into_iter()
            .filter_map(|n| self.parse_class(cx, n))
            .collect()
    }

    fn extract_interfaces(&self, cx: &Cx, root: Node) -> Vec<UceInterface> {
        let kinds = self.kinds();
        module_level(root, kinds.interfaces, kinds.wrappers)
            .into_iter()
            .filter_map(|n| self.parse_interface(cx, n))
            .collect()
    }

    fn extract_type_aliases(&self, cx: &Cx, root: Node) -> Vec<UceTypeAlias> {
        let kinds = self.kinds();
        module_level(root, kinds.type_aliases, kinds.wrappers)
            .into_iter()
            .filter_map(|n| self.parse_type_alias(cx, n))
            .collect()
    }

    fn extract_variables(&self, cx: &Cx, root: Node) -> Vec<UceVariable> {
        let kinds = self.kinds();
        module_level(root, kinds.variables, kinds.wrappers)
            .into_iter()
            .flat_map(|n| self.parse_variables(cx, n))
            .collect()
    }

    fn extract_imports(&self, cx: &Cx, root: Node) -> Vec<UceImport> {
        let kinds = self.kinds();
        module_level(root, kinds.imports, kinds.wrappers)
            .into_iter()
            .flat_map(|n| self.parse_imports(cx, n))
            .collect()
    }

    fn extract_exports(&self, _cx: &Cx, _root: Node) -> Vec<UceExport> {
        Vec::new()
    }

    fn parse_function(&self, cx: &Cx, node: Node) -> Option<UceFunction> {
        let name = cx.name(node)?;
        Some(cx.function(node, name, cx.fn_parts(node)))
    }

    /// A member of a class or interface body
    fn parse_method(&self, cx: &Cx, node: Node) -> Option<UceMethod> {
        let function = self.parse_function(cx, node)?;
        let visibility = visibility_from(&function.modifiers, self.default_visibility());
        Some(method(function, visibility))
    }

    fn parse_class(&self, cx: &Cx, node: Node) -> Option<UceClass> {
        let name = cx.name(node)?;
        let methods = class_body(node)
            .map(|body| {
                named_children(body)
                    .into_iter()
                    .filter(|m| self.kinds().methods.contains(&m.kind()))
                    .filter_map(|m| self.parse_method(cx, m))
                    .collect()
            })
            .unwrap_or_default();
        let modifiers = cx.modifiers(node);
        Some(UceClass {
            name,
            kind: ClassKind::Class,
            type_params: cx.type_params(node),
            extends: cx.field_text(node, "superclass"),
            methods,
            location: cx.location(node),
            doc_comment: cx.doc(node),
            is_abstract: modifiers.contains(crate::uce::Modifier::Abstract),
            modifiers,
            ..Default::default()
        })
    }

    fn parse_interface(&self, _cx: &Cx, _node: Node) -> Option<UceInterface> {
        None
    }

    fn parse_type_alias(&self, cx: &Cx, node: Node) -> Option<UceTypeAlias> {
        let name = cx.name(node)?;
        let aliased_type = ["value", "type"]
            .iter()
            .find_map(|f| cx.field_text(node, f))
            .unwrap_or_default();
        Some(UceTypeAlias {
            name,
            type_params: cx.type_params(node),
            aliased_type,
            location: cx.location(node),
            modifiers: cx.modifiers(node),
            doc_comment: cx.doc(node),
        })
    }

    fn parse_variables(&self, _cx: &Cx, _node: Node) -> Vec<UceVariable> {
        Vec::new()
    }

    fn parse_imports(&self, _cx: &Cx, _node: Node) -> Vec<UceImport> {
        Vec::new()
    }
}

/// Body node of a class-like declaration
pub fn class_body<'t>(node: Node<'t>) -> Option<Node<'t>> {
    node.child_by_field_name("body").or_else(|| {
        named_children(node).into_iter().find(|c| {
            matches!(
                c.kind(),
                "class_body"
                    | "declaration_list"
                    | "field_declaration_list"
                    | "enum_body"
                    | "enum_class_body"
                    | "interface_body"
                    | "protocol_body"
                    | "template_body"
                    | "body_statement"
                    | "block"
            )
        })
    })
}

/// Strategy driven purely by the node-kind table
pub struct TableStrategy(pub &'static NodeKinds);

impl LanguageStrategy for TableStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        self.0
    }
}
