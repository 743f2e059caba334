use crate::transform::docs::docstring;
use crate::transform::helpers::{
    Cx, FnParts, children_by_field, descendants_of_kind, method, module_level, named_children, underscore_visibility,
    unquote,
};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::LanguageStrategy;
use crate::language::SupportedLanguage;
use crate::uce::{
    ExportKind, ImportSpecifier, Modifier, Modifiers, SpecifierKind, UceClass, UceExport, UceFunction, UceImport,
    UceMethod, UceProperty, UceTypeAlias, UceVariable, VariableKind,
};
use tree_sitter::Node;

pub struct PythonStrategy;

/// `MAX_SIZE`, `DEFAULT_TIMEOUT`
fn is_constant_name(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Decorator expressions (without `@`) applied to a definition
fn decorators(cx: &Cx, node: Node) -> Vec<String> {
    let Some(parent) = node.parent().filter(|p| p.kind() == "decorated_definition") else {
        return Vec::new();
    };
    named_children(parent)
        .into_iter()
        .filter(|c| c.kind() == "decorator")
        .map(|d| cx.text(d).trim_start_matches('@').trim().to_string())
        .collect()
}

/// Unwrap `decorated_definition` to the definition it decorates
fn definition(node: Node) -> Node {
    if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition").unwrap_or(node)
    } else {
        node
    }
}

fn body_doc(cx: &Cx, node: Node) -> Option<String> {
    if !cx.options.doc_comments {
        return None;
    }
    node.child_by_field_name("body")
        .and_then(|body| docstring(cx.source, body))
        .or_else(|| cx.doc(node))
}

/// Simple or destructured names on the left of an assignment
fn assigned_names(cx: &Cx, left: Node) -> Vec<String> {
    match left.kind() {
        "identifier" => vec![cx.text(left).to_string()],
        "pattern_list" | "tuple_pattern" | "list_pattern" => descendants_of_kind(left, &["identifier"], &["attribute", "subscript"])
            .into_iter()
            .map(|n| cx.text(n).to_string())
            .collect(),
        _ => Vec::new(),
    }
}

fn assignment(statement: Node) -> Option<Node> {
    named_children(statement).into_iter().next().filter(|n| n.kind() == "assignment")
}

impl PythonStrategy {
    fn parts(&self, cx: &Cx, node: Node) -> FnParts {
        let mut parts = cx.fn_parts(node);
        parts.doc = body_doc(cx, node);
        parts
    }

    fn member(&self, cx: &Cx, node: Node) -> Option<UceMethod> {
        let name = cx.name(node)?;
        let decorators = decorators(cx, node);
        let has = |d: &str| decorators.iter().any(|x| x == d);
        let is_static = has("staticmethod") || has("classmethod");

        let mut parts = self.parts(cx, node);
        if !has("staticmethod") && parts.params.first().is_some_and(|p| p.name == "self" || p.name == "cls") {
            parts.params.remove(0);
        }
        if is_static {
            parts.modifiers.insert(Modifier::Static);
        }
        let is_abstract = decorators.iter().any(|d| d.ends_with("abstractmethod"));
        if is_abstract {
            parts.modifiers.insert(Modifier::Abstract);
        }
        if has("override") || has("typing.override") {
            parts.modifiers.insert(Modifier::Override);
        }

        let visibility = underscore_visibility(&name);
        let node = node.parent().filter(|p| p.kind() == "decorated_definition").unwrap_or(node);
        let mut m = method(cx.function(node, name, parts), visibility);
        m.is_getter = has("property") || decorators.iter().any(|d| d.ends_with(".getter"));
        m.is_setter = decorators.iter().any(|d| d.ends_with(".setter"));
        Some(m)
    }

    /// `x: int = 0` in a class body
    fn class_attributes(&self, cx: &Cx, statement: Node) -> Vec<UceProperty> {
        let Some(assign) = assignment(statement) else {
            return Vec::new();
        };
        let Some(left) = assign.child_by_field_name("left") else {
            return Vec::new();
        };
        assigned_names(cx, left)
            .into_iter()
            .map(|name| {
                let visibility = underscore_visibility(&name);
                let mut prop = cx.property(statement, name, cx.field_text(assign, "type"), visibility);
                prop.is_static = true;
                prop.initializer = cx.field_text(assign, "right");
                prop
            })
            .collect()
    }

    /// `self.x = ...` assignments inside `__init__`
    fn instance_attributes(&self, cx: &Cx, init: Node, out: &mut Vec<UceProperty>) {
        let Some(body) = init.child_by_field_name("body") else { return };
        for assign in descendants_of_kind(body, &["assignment"], &["function_definition", "class_definition", "lambda"]) {
            let Some(left) = assign.child_by_field_name("left").filter(|l| l.kind() == "attribute") else {
                continue;
            };
            let object = left.child_by_field_name("object").map(|o| cx.text(o));
            let Some(attr) = left.child_by_field_name("attribute").map(|a| cx.text(a).to_string()) else {
                continue;
            };
            if object != Some("self") || out.iter().any(|p| p.name == attr) {
                continue;
            }
            let visibility = underscore_visibility(&attr);
            let mut prop = cx.property(assign, attr, cx.field_text(assign, "type"), visibility);
            prop.initializer = cx.field_text(assign, "right");
            out.push(prop);
        }
    }
}

impl LanguageStrategy for PythonStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::Python)
    }

    fn parse_function(&self, cx: &Cx, node: Node) -> Option<UceFunction> {
        let name = cx.name(node)?;
        let parts = self.parts(cx, node);
        let anchor = node.parent().filter(|p| p.kind() == "decorated_definition").unwrap_or(node);
        Some(cx.function(anchor, name, parts))
    }

    fn parse_class(&self, cx: &Cx, node: Node) -> Option<UceClass> {
        let name = cx.name(node)?;

        let mut bases = Vec::new();
        let mut is_abstract = false;
        if let Some(args) = node.child_by_field_name("superclasses") {
            for arg in named_children(args) {
                if arg.kind() == "keyword_argument" {
                    is_abstract |= cx.field_text(arg, "value").is_some_and(|v| v.ends_with("ABCMeta"));
                } else {
                    let base = cx.text(arg).to_string();
                    is_abstract |= base == "ABC" || base == "abc.ABC";
                    bases.push(base);
                }
            }
        }
        let mut bases = bases.into_iter();
        let extends = bases.next();
        let implements = bases.collect();

        let mut methods = Vec::new();
        let mut properties = Vec::new();
        let mut constructor = None;
        let body = node.child_by_field_name("body");
        for member in body.map(named_children).unwrap_or_default() {
            match member.kind() {
                "function_definition" | "decorated_definition" => {
                    let def = definition(member);
                    if def.kind() != "function_definition" {
                        continue;
                    }
                    let Some(m) = self.member(cx, def) else { continue };
                    if m.name() == "__init__" && constructor.is_none() {
                        constructor = Some(m);
                        self.instance_attributes(cx, def, &mut properties);
                    } else {
                        methods.push(m);
                    }
                }
                "expression_statement" => properties.extend(self.class_attributes(cx, member)),
                _ => {}
            }
        }

        let mut modifiers = Modifiers::new();
        is_abstract |= methods.iter().any(|m: &UceMethod| m.is_abstract);
        if is_abstract {
            modifiers.insert(Modifier::Abstract);
        }
        let anchor = node.parent().filter(|p| p.kind() == "decorated_definition").unwrap_or(node);
        Some(UceClass {
            name,
            type_params: cx.type_params(node),
            extends,
            implements,
            methods,
            properties,
            constructor,
            location: cx.location(anchor),
            modifiers,
            doc_comment: body_doc(cx, node),
            is_abstract,
            ..Default::default()
        })
    }

    fn parse_type_alias(&self, cx: &Cx, node: Node) -> Option<UceTypeAlias> {
        let left = node.child_by_field_name("left")?;
        let name = cx.name(left).unwrap_or_else(|| cx.text(left).to_string());
        Some(UceTypeAlias {
            name,
            type_params: cx.type_params(left),
            aliased_type: cx.field_text(node, "right").unwrap_or_default(),
            location: cx.location(node),
            modifiers: Modifiers::new(),
            doc_comment: cx.doc(node),
        })
    }

    fn parse_variables(&self, cx: &Cx, node: Node) -> Vec<UceVariable> {
        let Some(assign) = assignment(node) else {
            return Vec::new();
        };
        let Some(left) = assign.child_by_field_name("left") else {
            return Vec::new();
        };
        assigned_names(cx, left)
            .into_iter()
            .map(|name| {
                let constant = is_constant_name(&name);
                UceVariable {
                    kind: if constant { VariableKind::Const } else { VariableKind::Var },
                    var_type: cx.field_text(assign, "type"),
                    initializer: cx.field_text(assign, "right"),
                    location: cx.location(node),
                    modifiers: if constant {
                        Modifiers::new().with(Modifier::Const)
                    } else {
                        Modifiers::new()
                    },
                    doc_comment: cx.doc(node),
                    name,
                }
            })
            .collect()
    }

    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        let location = cx.location(node);
        let alias_pair = |n: Node| -> Option<(String, Option<String>)> {
            if n.kind() == "aliased_import" {
                Some((cx.field_text(n, "name")?, cx.field_text(n, "alias")))
            } else {
                Some((cx.text(n).trim().to_string(), None))
            }
        };

        if node.kind() == "import_statement" {
            return children_by_field(node, "name")
                .into_iter()
                .filter_map(alias_pair)
                .map(|(module, alias)| UceImport {
                    specifiers: vec![ImportSpecifier {
                        local: alias.unwrap_or_else(|| module.clone()),
                        imported: module.clone(),
                        kind: SpecifierKind::Namespace,
                    }],
                    source: module,
                    is_type_only: false,
                    is_side_effect: false,
                    location: location.clone(),
                })
                .collect();
        }

        let Some(source) = cx.field_text(node, "module_name") else {
            return Vec::new();
        };
        let mut specifiers: Vec<ImportSpecifier> = children_by_field(node, "name")
            .into_iter()
            .filter_map(alias_pair)
            .map(|(imported, alias)| ImportSpecifier {
                local: alias.unwrap_or_else(|| imported.clone()),
                imported,
                kind: SpecifierKind::Named,
            })
            .collect();
        if named_children(node).iter().any(|c| c.kind() == "wildcard_import") {
            specifiers.push(ImportSpecifier {
                local: "*".to_string(),
                imported: "*".to_string(),
                kind: SpecifierKind::Namespace,
            });
        }
        vec![UceImport {
            source,
            specifiers,
            is_type_only: false,
            is_side_effect: false,
            location,
        }]
    }

    /// Entries of a module-level `__all__` list
    fn extract_exports(&self, cx: &Cx, root: Node) -> Vec<UceExport> {
        let mut out = Vec::new();
        for statement in module_level(root, &["expression_statement"], &[]) {
            let Some(assign) = assignment(statement) else { continue };
            if cx.field_text(assign, "left").as_deref() != Some("__all__") {
                continue;
            }
            let Some(list) = assign.child_by_field_name("right") else { continue };
            for item in named_children(list).into_iter().filter(|i| i.kind() == "string") {
                out.push(UceExport {
                    name: unquote(cx.text(item)),
                    local_name: None,
                    kind: ExportKind::Named,
                    source: None,
                    is_type_only: false,
                    location: cx.location(item),
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::SupportedLanguage;
    use crate::test_support::transform;
    use crate::uce::{Modifier, SpecifierKind, VariableKind, Visibility};

    const USERS: &str = r#"
"""User management."""
import os
import numpy as np
from typing import List, Optional as Opt
from .models import *

MAX_USERS = 100
registry: dict = {}
__all__ = ["UserService", "load"]

# Loads a user by id.
async def load(user_id: int, *args, verbose=False, **kwargs) -> "User":
    if user_id < 0 and verbose:
        raise ValueError()
    return await fetch(user_id)

class UserService(BaseService, Mixin):
    """Manages users."""

    default_role = "member"

    def __init__(self, db, name: str = "svc"):
        self.db = db
        self._cache = {}

    def get_name(self) -> str:
        return self.name

    def _validate(self, user):
        return user is not None

    @staticmethod
    def create(config):
        return UserService(config)

    @property
    def size(self):
        return len(self._cache)

    @size.setter
    def size(self, value):
        pass

    def __repr__(self):
        return "UserService"

    def nested(self):
        def helper():
            pass
        return helper
"#;

    #[test]
    fn test_underscore_visibility_on_methods() {
        let file = transform(USERS, SupportedLanguage::Python);
        let svc = file.find_class("UserService").unwrap();
        let vis = |name: &str| svc.methods.iter().find(|m| m.name() == name).unwrap().visibility;
        assert_eq!(vis("_validate"), Visibility::Private);
        assert_eq!(vis("get_name"), Visibility::Public);
        assert_eq!(vis("__repr__"), Visibility::Public);
    }

    #[test]
    fn test_class_shape() {
        let file = transform(USERS, SupportedLanguage::Python);
        let svc = file.find_class("UserService").unwrap();
        assert_eq!(svc.extends.as_deref(), Some("BaseService"));
        assert_eq!(svc.implements, ["Mixin"]);
        assert_eq!(svc.doc_comment.as_deref(), Some("Manages users."));

        let ctor = svc.constructor.as_ref().unwrap();
        let params: Vec<_> = ctor.function.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(params, ["db", "name"]);

        let props: Vec<_> = svc.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(props, ["default_role", "db", "_cache"]);
        assert!(svc.properties[0].is_static);
        assert_eq!(svc.properties[2].visibility, Visibility::Private);

        let create = svc.methods.iter().find(|m| m.name() == "create").unwrap();
        assert!(create.is_static);
        assert_eq!(create.function.params[0].name, "config");

        let getters: Vec<_> = svc.methods.iter().filter(|m| m.is_getter).map(|m| m.name()).collect();
        assert_eq!(getters, ["size"]);
        assert_eq!(svc.methods.iter().filter(|m| m.is_setter).count(), 1);
    }

    #[test]
    fn test_functions_are_module_level_only() {
        let file = transform(USERS, SupportedLanguage::Python);
        let names: Vec<_> = file.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["load"]);

        let load = &file.functions[0];
        assert!(load.modifiers.contains(Modifier::Async));
        assert_eq!(load.doc_comment.as_deref(), Some("Loads a user by id."));
        assert_eq!(load.params.len(), 4);
        assert!(load.params[1].is_rest);
        assert!(load.params[2].is_optional);
        assert!(load.params[3].is_rest);
        assert_eq!(load.complexity, 3);
    }

    #[test]
    fn test_variables_and_exports() {
        let file = transform(USERS, SupportedLanguage::Python);
        let names: Vec<_> = file.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["MAX_USERS", "registry", "__all__"]);
        assert_eq!(file.variables[0].kind, VariableKind::Const);
        assert_eq!(file.variables[1].var_type.as_deref(), Some("dict"));

        let exports: Vec<_> = file.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(exports, ["UserService", "load"]);
    }

    #[test]
    fn test_imports() {
        let file = transform(USERS, SupportedLanguage::Python);
        assert_eq!(file.imports.len(), 4);
        assert_eq!(file.imports[0].source, "os");
        assert_eq!(file.imports[1].specifiers[0].local, "np");
        assert_eq!(file.imports[2].source, "typing");
        assert_eq!(file.imports[2].specifiers[1].local, "Opt");
        assert_eq!(file.imports[2].specifiers[1].imported, "Optional");
        assert_eq!(file.imports[3].source, ".models");
        assert_eq!(file.imports[3].specifiers[0].kind, SpecifierKind::Namespace);
    }

    #[test]
    fn test_abstract_class() {
        let source = "from abc import ABC, abstractmethod\n\nclass Shape(ABC):\n    @abstractmethod\n    def area(self):\n        ...\n";
        let file = transform(source, SupportedLanguage::Python);
        let shape = file.find_class("Shape").unwrap();
        assert!(shape.is_abstract);
        assert!(shape.methods[0].is_abstract);
        assert!(shape.methods[0].function.params.is_empty());
    }
}
