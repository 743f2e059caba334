//! Ruby
//!
//! Visibility is positional: a bare `private`/`protected`/`public` switches
//! the default for the methods that follow it, and `private :name` changes
//! an already defined method.

use crate::transform::helpers::{Cx, children, descendants_of_kind, method, named_children, unquote};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::{LanguageStrategy, class_body};
use crate::language::SupportedLanguage;
use crate::uce::{
    ClassKind, Modifier, Modifiers, UceClass, UceFunction, UceImport, UceMethod, UceProperty, UceVariable,
    VariableKind, Visibility,
};
use tree_sitter::Node;

pub struct RubyStrategy;

const IMPORT_METHODS: &[&str] = &["require", "require_relative", "load"];

fn section(word: &str) -> Option<Visibility> {
    match word {
        "private" => Some(Visibility::Private),
        "protected" => Some(Visibility::Protected),
        "public" => Some(Visibility::Public),
        _ => None,
    }
}

/// Method name and argument nodes of a receiverless call
fn command<'t>(cx: &Cx<'t>, node: Node<'t>) -> Option<(&'t str, Vec<Node<'t>>)> {
    if node.kind() != "call" || node.child_by_field_name("receiver").is_some() {
        return None;
    }
    let name = cx.text(node.child_by_field_name("method")?);
    let args = node.child_by_field_name("arguments").map(named_children).unwrap_or_default();
    Some((name, args))
}

fn symbol_name(cx: &Cx, node: Node) -> String {
    let text = cx.text(node).trim().trim_start_matches(':');
    unquote(text)
}

impl RubyStrategy {
    fn member(&self, cx: &Cx, node: Node, visibility: Visibility) -> Option<UceMethod> {
        let name = cx.name(node)?;
        let mut parts = cx.fn_parts(node);
        if node.kind() == "singleton_method" {
            parts.modifiers.insert(Modifier::Static);
        }
        Some(method(cx.function(node, name, parts), visibility))
    }

    /// `@x = ...` assignments inside `initialize`
    fn instance_variables(&self, cx: &Cx, init: Node) -> Vec<UceProperty> {
        let mut out: Vec<UceProperty> = Vec::new();
        for assignment in descendants_of_kind(init, &["assignment", "operator_assignment"], &["method", "singleton_method"]) {
            let Some(left) = assignment.child_by_field_name("left") else { continue };
            if left.kind() != "instance_variable" {
                continue;
            }
            let name = cx.text(left).trim_start_matches('@').to_string();
            if out.iter().any(|p| p.name == name) {
                continue;
            }
            let mut prop = cx.property(assignment, name, None, Visibility::Private);
            prop.doc_comment = None;
            out.push(prop);
        }
        out
    }

    fn class(&self, cx: &Cx, node: Node) -> Option<UceClass> {
        let name = cx.name(node)?;
        let kind = if node.kind() == "module" { ClassKind::Module } else { ClassKind::Class };
        let mut class = UceClass {
            name,
            kind,
            extends: node
                .child_by_field_name("superclass")
                .map(|s| cx.text(s).trim().trim_start_matches('<').trim().to_string()),
            location: cx.location(node),
            doc_comment: cx.doc(node),
            modifiers: Modifiers::new().with(Modifier::Export),
            ..Default::default()
        };

        let mut current = Visibility::Public;
        let mut ivars = Vec::new();
        for stmt in class_body(node).map(named_children).unwrap_or_default() {
            match stmt.kind() {
                "identifier" => {
                    if let Some(v) = section(cx.text(stmt).trim()) {
                        current = v;
                    }
                }
                "method" if cx.name(stmt).as_deref() == Some("initialize") => {
                    ivars = self.instance_variables(cx, stmt);
                    class.constructor = self.member(cx, stmt, Visibility::Public);
                }
                "method" | "singleton_method" => class.methods.extend(self.member(cx, stmt, current)),
                "assignment" => {
                    let Some(left) = stmt.child_by_field_name("left").filter(|l| l.kind() == "constant") else {
                        continue;
                    };
                    let mut prop = cx.property(stmt, cx.text(left).to_string(), None, Visibility::Public);
                    prop.is_static = true;
                    prop.is_readonly = true;
                    prop.initializer = cx.field_text(stmt, "right");
                    class.properties.push(prop);
                }
                "call" => self.class_command(cx, stmt, &mut class),
                _ => {}
            }
        }
        for ivar in ivars {
            if !class.properties.iter().any(|p| p.name == ivar.name) {
                class.properties.push(ivar);
            }
        }
        Some(class)
    }

    /// `attr_*`, `include`, `private :m` and `private def m`
    fn class_command(&self, cx: &Cx, node: Node, class: &mut UceClass) {
        let Some((name, args)) = command(cx, node) else { return };
        match name {
            "attr_reader" | "attr_writer" | "attr_accessor" => {
                for arg in args {
                    let mut prop = cx.property(node, symbol_name(cx, arg), None, Visibility::Public);
                    prop.is_readonly = name == "attr_reader";
                    class.properties.push(prop);
                }
            }
            "include" | "extend" | "prepend" => {
                class.implements.extend(args.iter().map(|a| cx.text(*a).trim().to_string()));
            }
            _ => {
                let Some(visibility) = section(name) else { return };
                for arg in args {
                    if matches!(arg.kind(), "method" | "singleton_method") {
                        class.methods.extend(self.member(cx, arg, visibility));
                        continue;
                    }
                    let target = symbol_name(cx, arg);
                    if let Some(m) = class.methods.iter_mut().find(|m| m.function.name == target) {
                        m.visibility = visibility;
                    }
                }
            }
        }
    }
}

impl LanguageStrategy for RubyStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::Ruby)
    }

    fn parse_function(&self, cx: &Cx, node: Node) -> Option<UceFunction> {
        let name = cx.name(node)?;
        let mut parts = cx.fn_parts(node);
        parts.modifiers.insert(Modifier::Export);
        Some(cx.function(node, name, parts))
    }

    /// Classes and modules, including those nested in modules
    fn extract_classes(&self, cx: &Cx, root: Node) -> Vec<UceClass> {
        let mut out = Vec::new();
        let mut stack: Vec<Node> = children(root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if !matches!(node.kind(), "class" | "module") {
                continue;
            }
            out.extend(self.class(cx, node));
            if node.kind() == "module" {
                if let Some(body) = class_body(node) {
                    stack.extend(children(body).into_iter().rev());
                }
            }
        }
        out
    }

    fn parse_variables(&self, cx: &Cx, node: Node) -> Vec<UceVariable> {
        let Some(left) = node.child_by_field_name("left") else {
            return Vec::new();
        };
        let (kind, modifiers) = match left.kind() {
            "constant" => (VariableKind::Const, Modifiers::new().with(Modifier::Const).with(Modifier::Export)),
            "identifier" => (VariableKind::Var, Modifiers::new()),
            "global_variable" => (VariableKind::Static, Modifiers::new().with(Modifier::Export)),
            _ => return Vec::new(),
        };
        vec![UceVariable {
            name: cx.text(left).to_string(),
            kind,
            var_type: None,
            initializer: cx.field_text(node, "right"),
            location: cx.location(node),
            modifiers,
            doc_comment: cx.doc(node),
        }]
    }

    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        let Some((name, args)) = command(cx, node) else {
            return Vec::new();
        };
        if !IMPORT_METHODS.contains(&name) {
            return Vec::new();
        }
        let Some(arg) = args.first().filter(|a| a.kind() == "string") else {
            return Vec::new();
        };
        vec![UceImport {
            source: unquote(cx.text(*arg)),
            specifiers: Vec::new(),
            is_type_only: false,
            is_side_effect: true,
            location: cx.location(node),
        }]
    }
}
