use crate::transform::helpers::{Cx, child_of_kind, method, module_level, named_children};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::LanguageStrategy;
use crate::language::SupportedLanguage;
use crate::uce::{
    ClassKind, ImportSpecifier, Modifier, Modifiers, SpecifierKind, UceClass, UceFunction, UceImport, UceInterface,
    UceMethod, UceProperty, UceTypeAlias, UceVariable, VariableKind, Visibility,
};
use tree_sitter::Node;

pub struct RustStrategy;

/// `pub` is public and exported, `pub(crate)`/`pub(super)` internal,
/// no keyword private.
fn visibility(cx: &Cx, node: Node) -> Visibility {
    match child_of_kind(node, &["visibility_modifier"]).map(|v| cx.text(v).trim()) {
        Some("pub") => Visibility::Public,
        Some(_) => Visibility::Internal,
        None => Visibility::Private,
    }
}

fn modifiers(cx: &Cx, node: Node) -> Modifiers {
    let mut mods: Modifiers = cx.modifiers(node).iter().filter(|m| *m != Modifier::Export).collect();
    if visibility(cx, node) == Visibility::Public {
        mods.insert(Modifier::Export);
    }
    mods
}

/// Bare type name of an `impl` target: `Wrapper<T>` → `Wrapper`
fn impl_type(cx: &Cx, node: Node) -> Option<String> {
    let ty = node.child_by_field_name("type")?;
    let base = if ty.kind() == "generic_type" {
        ty.child_by_field_name("type").unwrap_or(ty)
    } else {
        ty
    };
    let text = cx.text(base).trim();
    (!text.is_empty()).then(|| text.rsplit("::").next().unwrap_or(text).to_string())
}

/// One flattened `use` path
struct UsePath {
    path: String,
    local: Option<String>,
    glob: bool,
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}::{}", prefix, segment)
    }
}

fn flatten_use(cx: &Cx, root: Node, prefix: &str) -> Vec<UsePath> {
    let mut out = Vec::new();
    let mut stack = vec![(root, prefix.to_string())];
    while let Some((node, prefix)) = stack.pop() {
        match node.kind() {
            "use_as_clause" => {
                if let Some(path) = node.child_by_field_name("path") {
                    out.push(UsePath {
                        path: join(&prefix, cx.text(path)),
                        local: cx.field_text(node, "alias"),
                        glob: false,
                    });
                }
            }
            "use_list" => {
                stack.extend(named_children(node).into_iter().rev().map(|c| (c, prefix.clone())));
            }
            "scoped_use_list" => {
                let inner = match node.child_by_field_name("path") {
                    Some(path) => join(&prefix, cx.text(path)),
                    None => prefix.clone(),
                };
                if let Some(list) = node.child_by_field_name("list") {
                    stack.push((list, inner));
                }
            }
            "use_wildcard" => {
                let path = named_children(node)
                    .into_iter()
                    .next()
                    .map(|p| join(&prefix, cx.text(p)))
                    .unwrap_or(prefix);
                out.push(UsePath {
                    path,
                    local: None,
                    glob: true,
                });
            }
            "self" => out.push(UsePath {
                path: prefix,
                local: None,
                glob: false,
            }),
            _ => out.push(UsePath {
                path: join(&prefix, cx.text(node).trim()),
                local: None,
                glob: false,
            }),
        }
    }
    out
}

impl RustStrategy {
    fn function_parts(&self, cx: &Cx, node: Node) -> crate::transform::helpers::FnParts {
        let mut parts = cx.fn_parts(node);
        parts.modifiers = modifiers(cx, node);
        parts
    }

    fn impl_method(&self, cx: &Cx, node: Node, in_trait: bool) -> Option<UceMethod> {
        let name = cx.name(node)?;
        let has_receiver = cx
            .params_node(node)
            .is_some_and(|p| named_children(p).iter().any(|c| c.kind() == "self_parameter"));
        let mut parts = self.function_parts(cx, node);
        if !has_receiver {
            parts.modifiers.insert(Modifier::Static);
        }
        if node.kind() == "function_signature_item" {
            parts.modifiers.insert(Modifier::Abstract);
        }
        let visibility = if in_trait { Visibility::Public } else { visibility(cx, node) };
        Some(method(cx.function(node, name, parts), visibility))
    }

    fn body_methods(&self, cx: &Cx, node: Node, in_trait: bool) -> Vec<UceMethod> {
        node.child_by_field_name("body")
            .map(named_children)
            .unwrap_or_default()
            .into_iter()
            .filter(|m| self.kinds().methods.contains(&m.kind()))
            .filter_map(|m| self.impl_method(cx, m, in_trait))
            .collect()
    }

    fn fields(&self, cx: &Cx, node: Node) -> Vec<UceProperty> {
        let Some(body) = node.child_by_field_name("body") else {
            return Vec::new();
        };
        match body.kind() {
            "field_declaration_list" => named_children(body)
                .into_iter()
                .filter(|f| f.kind() == "field_declaration")
                .filter_map(|f| {
                    let name = cx.field_text(f, "name")?;
                    Some(cx.property(f, name, cx.field_text(f, "type"), visibility(cx, f)))
                })
                .collect(),
            "ordered_field_declaration_list" => {
                let vis = child_of_kind(body, &["visibility_modifier"]).map(|_| visibility(cx, body));
                let mut cursor = body.walk();
                body.children_by_field_name("type", &mut cursor)
                    .enumerate()
                    .map(|(i, ty)| {
                        cx.property(ty, i.to_string(), Some(cx.text(ty).to_string()), vis.unwrap_or(Visibility::Private))
                    })
                    .collect()
            }
            "enum_variant_list" => named_children(body)
                .into_iter()
                .filter(|v| v.kind() == "enum_variant")
                .filter_map(|v| {
                    let name = cx.field_text(v, "name")?;
                    let mut prop = cx.property(v, name, cx.field_text(v, "body"), Visibility::Public);
                    prop.is_static = true;
                    prop.is_readonly = true;
                    prop.initializer = cx.field_text(v, "value");
                    Some(prop)
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl LanguageStrategy for RustStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::Rust)
    }

    fn default_visibility(&self) -> Visibility {
        Visibility::Private
    }

    fn parse_function(&self, cx: &Cx, node: Node) -> Option<UceFunction> {
        let name = cx.name(node)?;
        Some(cx.function(node, name, self.function_parts(cx, node)))
    }

    fn extract_classes(&self, cx: &Cx, root: Node) -> Vec<UceClass> {
        let kinds = self.kinds();
        let candidates = module_level(root, kinds.classes, kinds.wrappers);

        let mut classes: Vec<UceClass> = candidates
            .iter()
            .filter(|n| n.kind() != "impl_item")
            .filter_map(|node| {
                let name = cx.name(*node)?;
                Some(UceClass {
                    kind: if node.kind() == "enum_item" { ClassKind::Enum } else { ClassKind::Struct },
                    type_params: cx.type_params(*node),
                    properties: self.fields(cx, *node),
                    location: cx.location(*node),
                    modifiers: modifiers(cx, *node),
                    doc_comment: cx.doc(*node),
                    name,
                    ..Default::default()
                })
            })
            .collect();

        for block in candidates.into_iter().filter(|n| n.kind() == "impl_item") {
            let Some(owner) = impl_type(cx, block) else { continue };
            let trait_name = cx.field_text(block, "trait");
            let methods = self.body_methods(cx, block, trait_name.is_some());
            let idx = match classes.iter().position(|c| c.name == owner) {
                Some(idx) => idx,
                None => {
                    classes.push(UceClass {
                        name: owner,
                        kind: ClassKind::Extension,
                        type_params: cx.type_params(block),
                        location: cx.location(block),
                        doc_comment: cx.doc(block),
                        ..Default::default()
                    });
                    classes.len() - 1
                }
            };
            let class = &mut classes[idx];
            class.methods.extend(methods);
            if let Some(t) = trait_name {
                if !class.implements.contains(&t) {
                    class.implements.push(t);
                }
            }
        }
        classes
    }

    fn parse_interface(&self, cx: &Cx, node: Node) -> Option<UceInterface> {
        let name = cx.name(node)?;
        let extends = node
            .child_by_field_name("bounds")
            .map(|b| named_children(b).into_iter().map(|t| cx.text(t).to_string()).collect())
            .unwrap_or_default();
        Some(UceInterface {
            type_params: cx.type_params(node),
            extends,
            methods: self.body_methods(cx, node, true),
            location: cx.location(node),
            modifiers: modifiers(cx, node),
            doc_comment: cx.doc(node),
            name,
            ..Default::default()
        })
    }

    fn parse_type_alias(&self, cx: &Cx, node: Node) -> Option<UceTypeAlias> {
        Some(UceTypeAlias {
            name: cx.name(node)?,
            type_params: cx.type_params(node),
            aliased_type: cx.field_text(node, "type").unwrap_or_default(),
            location: cx.location(node),
            modifiers: modifiers(cx, node),
            doc_comment: cx.doc(node),
        })
    }

    fn parse_variables(&self, cx: &Cx, node: Node) -> Vec<UceVariable> {
        let Some(name) = cx.name(node) else {
            return Vec::new();
        };
        let kind = if node.kind() == "static_item" { VariableKind::Static } else { VariableKind::Const };
        let mut mods = modifiers(cx, node);
        if kind == VariableKind::Const {
            mods.insert(Modifier::Const);
        }
        vec![UceVariable {
            name,
            kind,
            var_type: cx.field_text(node, "type"),
            initializer: cx.field_text(node, "value"),
            location: cx.location(node),
            modifiers: mods,
            doc_comment: cx.doc(node),
        }]
    }

    /// `use a::{b, c as d, e::*}` becomes one import per source module
    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        let Some(argument) = node.child_by_field_name("argument") else {
            return Vec::new();
        };
        let location = cx.location(node);
        let mut imports: Vec<UceImport> = Vec::new();
        for used in flatten_use(cx, argument, "") {
            let (source, specifier) = if used.glob {
                (
                    used.path,
                    ImportSpecifier {
                        local: "*".to_string(),
                        imported: "*".to_string(),
                        kind: SpecifierKind::Namespace,
                    },
                )
            } else {
                let (parent, last) = match used.path.rsplit_once("::") {
                    Some((parent, last)) => (parent.to_string(), last.to_string()),
                    None => (String::new(), used.path.clone()),
                };
                let source = if parent.is_empty() { used.path.clone() } else { parent };
                (
                    source,
                    ImportSpecifier {
                        local: used.local.unwrap_or_else(|| last.clone()),
                        imported: last,
                        kind: SpecifierKind::Named,
                    },
                )
            };
            match imports.iter_mut().find(|i| i.source == source) {
                Some(existing) => existing.specifiers.push(specifier),
                None => imports.push(UceImport {
                    source,
                    specifiers: vec![specifier],
                    is_type_only: false,
                    is_side_effect: false,
                    location: location.clone(),
                }),
            }
        }
        imports
    }
}

#[cfg(test)]
mod tests {
    use crate::SupportedLanguage;
    use crate::test_support::transform;
    use crate::uce::{ClassKind, Modifier, SpecifierKind, VariableKind, Visibility};

    const SOURCE: &str = r#"
use std::collections::{HashMap, BTreeMap as Ordered};
use std::io::*;
use crate::error::Result;

pub const LIMIT: usize = 10;
static mut COUNTER: u32 = 0;

/// A point in space.
#[derive(Debug, Clone)]
pub struct Point {
    pub x: f64,
    pub(crate) y: f64,
    label: String,
}

pub struct Meters(pub f64);

pub enum Shape {
    Circle { radius: f64 },
    Square(f64),
    Empty,
}

pub trait Area: Send + Sync {
    fn area(&self) -> f64;
    fn describe(&self) -> String {
        format!("{}", self.area())
    }
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, label: String::new() }
    }

    fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Area for Shape {
    fn area(&self) -> f64 {
        match self {
            Shape::Circle { radius } => radius * radius,
            Shape::Square(s) => s * s,
            Shape::Empty => 0.0,
        }
    }
}

impl std::fmt::Display for Wrapper<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        Ok(())
    }
}

pub type Grid = Vec<Vec<Point>>;

pub async fn load(path: &str) -> Result<Point> {
    todo!()
}

pub(crate) fn helper() {}

mod inner {
    pub fn nested() {}
}
"#;

    #[test]
    fn test_functions_and_visibility() {
        let file = transform(SOURCE, SupportedLanguage::Rust);
        let names: Vec<_> = file.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["load", "helper", "nested"]);

        let load = &file.functions[0];
        assert!(load.modifiers.contains(Modifier::Export));
        assert!(load.modifiers.contains(Modifier::Async));
        assert_eq!(load.return_type.as_deref(), Some("Result<Point>"));
        assert!(!file.functions[1].modifiers.contains(Modifier::Export));
    }

    #[test]
    fn test_struct_fields() {
        let file = transform(SOURCE, SupportedLanguage::Rust);
        let point = file.find_class("Point").unwrap();
        assert_eq!(point.kind, ClassKind::Struct);
        assert_eq!(point.doc_comment.as_deref(), Some("A point in space."));
        let vis: Vec<_> = point.properties.iter().map(|p| p.visibility).collect();
        assert_eq!(vis, [Visibility::Public, Visibility::Internal, Visibility::Private]);

        let meters = file.find_class("Meters").unwrap();
        assert_eq!(meters.properties[0].name, "0");
        assert_eq!(meters.properties[0].property_type.as_deref(), Some("f64"));
    }

    #[test]
    fn test_impl_blocks_attach() {
        let file = transform(SOURCE, SupportedLanguage::Rust);
        let point = file.find_class("Point").unwrap();
        let methods: Vec<_> = point.methods.iter().map(|m| m.name()).collect();
        assert_eq!(methods, ["new", "norm"]);
        assert!(point.methods[0].is_static);
        assert_eq!(point.methods[0].visibility, Visibility::Public);
        assert!(!point.methods[1].is_static);
        assert_eq!(point.methods[1].visibility, Visibility::Private);
        assert!(point.methods[1].function.params.is_empty());

        let shape = file.find_class("Shape").unwrap();
        assert_eq!(shape.kind, ClassKind::Enum);
        assert_eq!(shape.implements, ["Area"]);
        assert_eq!(shape.properties.len(), 3);

        let wrapper = file.find_class("Wrapper").unwrap();
        assert_eq!(wrapper.kind, ClassKind::Extension);
        assert_eq!(wrapper.implements, ["std::fmt::Display"]);
    }

    #[test]
    fn test_trait_is_interface() {
        let file = transform(SOURCE, SupportedLanguage::Rust);
        let area = file.find_interface("Area").unwrap();
        assert_eq!(area.extends, ["Send", "Sync"]);
        assert_eq!(area.methods.len(), 2);
        assert!(area.methods[0].is_abstract);
        assert!(!area.methods[1].is_abstract);
    }

    #[test]
    fn test_items() {
        let file = transform(SOURCE, SupportedLanguage::Rust);
        assert_eq!(file.type_aliases[0].name, "Grid");
        assert_eq!(file.type_aliases[0].aliased_type, "Vec<Vec<Point>>");

        assert_eq!(file.variables.len(), 2);
        assert_eq!(file.variables[0].kind, VariableKind::Const);
        assert!(file.variables[0].modifiers.contains(Modifier::Export));
        assert_eq!(file.variables[1].kind, VariableKind::Static);
    }

    #[test]
    fn test_use_trees() {
        let file = transform(SOURCE, SupportedLanguage::Rust);
        let sources: Vec<_> = file.imports.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, ["std::collections", "std::io", "crate::error"]);

        let collections = &file.imports[0];
        assert_eq!(collections.specifiers.len(), 2);
        assert_eq!(collections.specifiers[1].local, "Ordered");
        assert_eq!(collections.specifiers[1].imported, "BTreeMap");
        assert_eq!(file.imports[1].specifiers[0].kind, SpecifierKind::Namespace);
    }
}
