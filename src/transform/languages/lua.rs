//! Lua
//!
//! Lua has no class syntax. Functions declared as `function M.f()` or
//! `function M:f()` are gathered into a module-kind class named after the
//! table; `:` methods take an implicit `self` and are instance methods.

use crate::transform::helpers::{Cx, FnParts, child_of_kind, children_by_field, has_token, method, module_level, named_children, unquote};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::LanguageStrategy;
use crate::language::SupportedLanguage;
use crate::uce::{
    ClassKind, ImportSpecifier, Modifier, Modifiers, SpecifierKind, UceClass, UceFunction, UceImport,
    UceParameter, UceVariable, VariableKind, Visibility,
};
use tree_sitter::Node;

pub struct LuaStrategy;

/// `require("x")` / `require "x"`
fn required_module(cx: &Cx, call: Node) -> Option<String> {
    if call.kind() != "function_call" || cx.text(call.child_by_field_name("name")?) != "require" {
        return None;
    }
    let args = call.child_by_field_name("arguments")?;
    let first = if args.kind() == "string" {
        args
    } else {
        named_children(args).into_iter().next()?
    };
    (first.kind() == "string").then(|| unquote(cx.text(first)))
}

/// Name/value pairs of `a, b = 1, 2`, with or without `local`
fn bindings<'t>(node: Node<'t>) -> Vec<(Node<'t>, Option<Node<'t>>)> {
    let assignment = if node.kind() == "assignment_statement" {
        Some(node)
    } else {
        child_of_kind(node, &["assignment_statement"])
    };
    match assignment {
        Some(a) => {
            let list = child_of_kind(a, &["variable_list"]).unwrap_or(a);
            let names = children_by_field(list, "name");
            let values = child_of_kind(a, &["expression_list"])
                .map(|l| children_by_field(l, "value"))
                .unwrap_or_default();
            names
                .into_iter()
                .enumerate()
                .map(|(i, n)| (n, values.get(i).copied()))
                .collect()
        }
        None => child_of_kind(node, &["variable_list"])
            .map(|l| children_by_field(l, "name").into_iter().map(|n| (n, None)).collect())
            .unwrap_or_default(),
    }
}

impl LuaStrategy {
    fn parts(&self, cx: &Cx, node: Node) -> FnParts {
        let params = cx
            .params_node(node)
            .map(named_children)
            .unwrap_or_default()
            .into_iter()
            .flat_map(|p| {
                if p.kind() == "vararg_expression" {
                    vec![UceParameter {
                        name: "...".to_string(),
                        is_rest: true,
                        ..Default::default()
                    }]
                } else {
                    cx.param(p)
                }
            })
            .collect();
        let mut modifiers = Modifiers::new();
        if !has_token(node, "local") {
            modifiers.insert(Modifier::Export);
        }
        FnParts {
            params,
            modifiers,
            ..Default::default()
        }
    }
}

impl LanguageStrategy for LuaStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::Lua)
    }

    /// Plain `function f()` and `local function f()`
    fn parse_function(&self, cx: &Cx, node: Node) -> Option<UceFunction> {
        let name = node.child_by_field_name("name").filter(|n| n.kind() == "identifier")?;
        Some(cx.function(node, cx.text(name).to_string(), self.parts(cx, node)))
    }

    fn extract_classes(&self, cx: &Cx, root: Node) -> Vec<UceClass> {
        let mut classes: Vec<UceClass> = Vec::new();
        for node in module_level(root, self.kinds().classes, self.kinds().wrappers) {
            let Some(name) = node.child_by_field_name("name") else { continue };
            let (table, member, instance) = match name.kind() {
                "dot_index_expression" => (name.child_by_field_name("table"), name.child_by_field_name("field"), false),
                "method_index_expression" => (name.child_by_field_name("table"), name.child_by_field_name("method"), true),
                _ => continue,
            };
            let (Some(table), Some(member)) = (table, member) else { continue };

            let mut parts = self.parts(cx, node);
            parts.modifiers = Modifiers::new();
            if !instance {
                parts.modifiers.insert(Modifier::Static);
            }
            let m = method(cx.function(node, cx.text(member).to_string(), parts), Visibility::Public);

            let table_name = cx.text(table);
            let location = cx.location(node);
            match classes.iter_mut().find(|c| c.name == table_name) {
                Some(class) => {
                    class.location.end_line = location.end_line;
                    class.location.end_column = location.end_column;
                    class.methods.push(m);
                }
                None => classes.push(UceClass {
                    name: table_name.to_string(),
                    kind: ClassKind::Module,
                    methods: vec![m],
                    location,
                    modifiers: Modifiers::new().with(Modifier::Export),
                    ..Default::default()
                }),
            }
        }
        classes
    }

    fn parse_variables(&self, cx: &Cx, node: Node) -> Vec<UceVariable> {
        let local = node.kind() == "variable_declaration";
        bindings(node)
            .into_iter()
            .filter(|(name, value)| {
                name.kind() == "identifier" && !value.is_some_and(|v| required_module(cx, v).is_some())
            })
            .map(|(name, value)| UceVariable {
                name: cx.text(name).to_string(),
                kind: if local { VariableKind::Let } else { VariableKind::Var },
                var_type: None,
                initializer: value.map(|v| cx.text(v).trim().to_string()),
                location: cx.location(node),
                modifiers: if local { Modifiers::new() } else { Modifiers::new().with(Modifier::Export) },
                doc_comment: cx.doc(node),
            })
            .collect()
    }

    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        if node.kind() == "function_call" {
            return required_module(cx, node)
                .map(|source| UceImport {
                    source,
                    specifiers: Vec::new(),
                    is_type_only: false,
                    is_side_effect: true,
                    location: cx.location(node),
                })
                .into_iter()
                .collect();
        }
        bindings(node)
            .into_iter()
            .filter_map(|(name, value)| {
                let source = required_module(cx, value?)?;
                Some(UceImport {
                    source,
                    specifiers: vec![ImportSpecifier {
                        local: cx.text(name).to_string(),
                        imported: "default".to_string(),
                        kind: SpecifierKind::Default,
                    }],
                    is_type_only: false,
                    is_side_effect: false,
                    location: cx.location(node),
                })
            })
            .collect()
    }
}
