//! Shared builders for language strategies
//!
//! Every tree walk in here uses an explicit stack so deeply nested or
//! generated sources cannot exhaust the call stack.

use super::TransformOptions;
use super::complexity::cyclomatic;
use super::docs::preceding_comment;
use crate::language::SupportedLanguage;
use crate::uce::{Modifier, Modifiers, UceFunction, UceLocation, UceMethod, UceParameter, UceProperty, Visibility};
use tree_sitter::Node;

/// Node kinds that carry a plain name
pub const IDENTIFIER_KINDS: &[&str] = &[
    "identifier",
    "simple_identifier",
    "type_identifier",
    "field_identifier",
    "property_identifier",
    "private_property_identifier",
    "constant",
    "name",
    "variable_name",
    "word",
    "variable",
    "constructor",
    "package_identifier",
    "namespace_identifier",
    "shorthand_property_identifier_pattern",
    "shorthand_property_identifier",
];

/// Kinds that mark a rest/variadic parameter
const REST_KINDS: &[&str] = &[
    "rest_pattern",
    "rest_parameter",
    "list_splat_pattern",
    "dictionary_splat_pattern",
    "variadic_parameter",
    "variadic_parameter_declaration",
    "splat_parameter",
    "hash_splat_parameter",
    "spread_parameter",
];

/// Kinds holding modifier keywords as text
const MODIFIER_CONTAINERS: &[&str] = &[
    "modifiers",
    "modifier",
    "declaration_modifiers",
    "accessibility_modifier",
    "override_modifier",
    "visibility_modifier",
    "member_modifier",
    "function_modifier",
    "function_modifiers",
    "class_modifier",
    "inheritance_modifier",
    "property_modifier",
    "static_modifier",
    "abstract_modifier",
    "final_modifier",
    "readonly_modifier",
    "storage_class_specifier",
    "type_qualifier",
    "access_modifier",
];

pub fn is_comment(node: Node) -> bool {
    let kind = node.kind();
    kind.contains("comment") || kind == "haddock"
}

/// All children, including anonymous tokens
pub fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Named children, skipping comments
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).filter(|n| !is_comment(*n)).collect()
}

pub fn children_by_field<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// First direct child (named or anonymous) whose kind is in `kinds`
pub fn child_of_kind<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| kinds.contains(&c.kind()))
}

/// Whether a direct child token has this kind (keywords such as `interface`)
pub fn has_token(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == kind)
}

/// First descendant of one of `kinds`, pre-order
pub fn find_descendant<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.id() != node.id() && kinds.contains(&current.kind()) {
            return Some(current);
        }
        let mut kids = children(current);
        kids.reverse();
        stack.extend(kids);
    }
    None
}

/// All descendants of one of `kinds` in document order, not descending into
/// matches or into nodes of a `stop` kind
pub fn descendants_of_kind<'t>(node: Node<'t>, kinds: &[&str], stop: &[&str]) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut stack: Vec<Node<'t>> = children(node).into_iter().rev().collect();
    while let Some(current) = stack.pop() {
        if kinds.contains(&current.kind()) {
            out.push(current);
            continue;
        }
        if stop.contains(&current.kind()) {
            continue;
        }
        stack.extend(children(current).into_iter().rev());
    }
    out
}

/// Declarations of `targets` reachable from `root` through `wrappers` only
pub fn module_level<'t>(root: Node<'t>, targets: &[&str], wrappers: &[&str]) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut stack: Vec<Node<'t>> = children(root).into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if targets.contains(&node.kind()) {
            out.push(node);
        } else if wrappers.contains(&node.kind()) {
            stack.extend(children(node).into_iter().rev());
        }
    }
    out
}

/// Strip a leading `:` / `->` / `=` from annotation text
pub fn clean_type(text: &str) -> String {
    text.trim()
        .trim_start_matches(':')
        .trim_start_matches("->")
        .trim_start_matches('=')
        .trim()
        .to_string()
}

pub fn unquote(text: &str) -> String {
    let t = text.trim();
    for q in ["\"\"\"", "'''", "\"", "'", "`"] {
        if t.len() >= 2 * q.len() && t.starts_with(q) && t.ends_with(q) {
            return t[q.len()..t.len() - q.len()].to_string();
        }
    }
    t.to_string()
}

/// Go-style export convention: an uppercase first letter
pub fn is_capitalized(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Python convention: `_x` and `__x` are private, `__x__` is public
pub fn underscore_visibility(name: &str) -> Visibility {
    if name.starts_with("__") && name.ends_with("__") && name.len() > 4 {
        Visibility::Public
    } else if name.starts_with('_') {
        Visibility::Private
    } else {
        Visibility::Public
    }
}

/// Pieces of a function that vary by language
#[derive(Debug, Default)]
pub struct FnParts {
    pub params: Vec<UceParameter>,
    pub return_type: Option<String>,
    pub type_params: Vec<String>,
    pub modifiers: Modifiers,
    /// Overrides the preceding-comment lookup (docstrings, `@doc`)
    pub doc: Option<String>,
}

/// Read-only context threaded through a single transform call
pub struct Cx<'a> {
    pub source: &'a str,
    pub file_path: &'a str,
    pub language: SupportedLanguage,
    pub options: &'a TransformOptions,
}

impl<'a> Cx<'a> {
    pub fn new(source: &'a str, file_path: &'a str, language: SupportedLanguage, options: &'a TransformOptions) -> Self {
        Self {
            source,
            file_path,
            language,
            options,
        }
    }

    pub fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Trimmed, non-empty text of a field
    pub fn field_text(&self, node: Node, field: &str) -> Option<String> {
        let text = self.text(node.child_by_field_name(field)?).trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    pub fn location(&self, node: Node) -> UceLocation {
        let start = node.start_position();
        let end = node.end_position();
        UceLocation {
            file_path: self.file_path.to_string(),
            start_line: start.row + 1,
            end_line: end.row + 1,
            start_column: start.column,
            end_column: end.column,
        }
    }

    pub fn body(&self, node: Node) -> String {
        if !self.options.include_bodies {
            return String::new();
        }
        let text = self.text(node);
        match self.options.max_body_bytes {
            Some(max) if text.len() > max => {
                let mut end = max;
                while !text.is_char_boundary(end) {
                    end -= 1;
                }
                text[..end].to_string()
            }
            _ => text.to_string(),
        }
    }

    pub fn doc(&self, node: Node) -> Option<String> {
        if !self.options.doc_comments {
            return None;
        }
        preceding_comment(self.source, node)
    }

    pub fn complexity(&self, node: Node) -> u32 {
        if self.options.complexity {
            cyclomatic(node, self.source)
        } else {
            1
        }
    }

    /// Name of a declaration: the `name` field, else the first identifier child
    pub fn name(&self, node: Node) -> Option<String> {
        let candidate = node
            .child_by_field_name("name")
            .or_else(|| named_children(node).into_iter().find(|c| IDENTIFIER_KINDS.contains(&c.kind())))?;
        let text = if IDENTIFIER_KINDS.contains(&candidate.kind()) {
            self.text(candidate)
        } else {
            find_descendant(candidate, IDENTIFIER_KINDS).map(|n| self.text(n)).unwrap_or_else(|| self.text(candidate))
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Modifier keywords found on direct children and modifier containers
    pub fn modifiers(&self, node: Node) -> Modifiers {
        let mut mods = Modifiers::new();
        for child in children(node) {
            if MODIFIER_CONTAINERS.contains(&child.kind()) {
                for word in self.text(child).split(|c: char| c.is_whitespace() || c == '(') {
                    if word == "@Override" {
                        mods.insert(Modifier::Override);
                    } else if let Some(m) = Modifier::from_keyword(word) {
                        mods.insert(m);
                    }
                }
            } else if !child.is_named() {
                if let Some(m) = Modifier::from_keyword(child.kind()) {
                    mods.insert(m);
                }
            }
        }
        mods
    }

    /// Parameter list node of a callable
    pub fn params_node<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        node.child_by_field_name("parameters").or_else(|| {
            child_of_kind(
                node,
                &[
                    "formal_parameters",
                    "parameters",
                    "parameter_list",
                    "function_value_parameters",
                    "method_parameters",
                    "lambda_parameters",
                ],
            )
        })
    }

    /// Parameters of a parameter-list node
    pub fn params(&self, list: Node) -> Vec<UceParameter> {
        let mut out = Vec::new();
        let mut kids = children(list).into_iter();
        while let Some(child) = kids.next() {
            // C# `params T[] name` sits directly in the list, without a parameter node
            if !child.is_named() && child.kind() == "params" {
                let type_node = kids.next();
                if let Some(name) = kids.next() {
                    out.push(UceParameter {
                        name: self.text(name).trim().to_string(),
                        param_type: type_node.map(|t| clean_type(self.text(t))),
                        is_rest: true,
                        ..Default::default()
                    });
                }
                continue;
            }
            if child.is_named() && !is_comment(child) {
                out.extend(self.param(child));
            }
        }
        out
    }

    /// One parameter node; Go-style `a, b int` yields several
    pub fn param(&self, node: Node) -> Vec<UceParameter> {
        if matches!(
            node.kind(),
            "self_parameter" | "keyword_separator" | "positional_separator" | "comment" | "attribute_list"
        ) {
            return Vec::new();
        }

        let text = self.text(node).trim();
        let is_rest = REST_KINDS.contains(&node.kind())
            || find_descendant(node, REST_KINDS).is_some()
            || text.starts_with("...")
            || text.starts_with("params ")
            || text.starts_with("vararg ")
            || text.starts_with('*');

        let param_type = node
            .child_by_field_name("type")
            .map(|t| clean_type(self.text(t)))
            .or_else(|| {
                named_children(node)
                    .into_iter()
                    .find(|c| {
                        let k = c.kind();
                        k == "type_annotation" || k == "user_type" || k == "nullable_type" || k == "type"
                    })
                    .map(|t| clean_type(self.text(t)))
            })
            .filter(|t| !t.is_empty());

        let default_value = ["value", "default_value", "default"]
            .iter()
            .find_map(|f| self.field_text(node, f))
            .or_else(|| child_of_kind(node, &["equals_value_clause"]).map(|c| clean_type(self.text(c))));

        let is_optional = node.kind() == "optional_parameter"
            || default_value.is_some()
            || text.split(':').next().is_some_and(|head| head.trim_end().ends_with('?'));

        let names = children_by_field(node, "name");
        let name_nodes: Vec<Node> = if names.len() > 1 {
            names
        } else {
            let primary = names
                .first()
                .copied()
                .or_else(|| node.child_by_field_name("pattern"))
                .or_else(|| node.child_by_field_name("declarator"))
                .unwrap_or(node);
            vec![primary]
        };

        name_nodes
            .into_iter()
            .filter_map(|n| {
                let ident = if IDENTIFIER_KINDS.contains(&n.kind())
                    || matches!(n.kind(), "object_pattern" | "array_pattern" | "tuple_pattern")
                {
                    Some(n)
                } else {
                    let skip = n.child_by_field_name("type").map(|t| t.id());
                    let mut stack = vec![n];
                    let mut found = None;
                    while let Some(cur) = stack.pop() {
                        if Some(cur.id()) == skip || cur.kind().ends_with("type") || cur.kind() == "type_annotation" {
                            continue;
                        }
                        if cur.id() != n.id() && IDENTIFIER_KINDS.contains(&cur.kind()) && cur.kind() != "type_identifier" {
                            found = Some(cur);
                            break;
                        }
                        stack.extend(children(cur).into_iter().rev());
                    }
                    found
                }?;
                let name = self
                    .text(ident)
                    .trim_start_matches(['.', '*', '&'])
                    .trim()
                    .to_string();
                (!name.is_empty()).then(|| UceParameter {
                    name,
                    param_type: param_type.clone(),
                    is_optional,
                    is_rest,
                    default_value: default_value.clone(),
                })
            })
            .collect()
    }

    /// Type-parameter names of a declaration
    pub fn type_params(&self, node: Node) -> Vec<String> {
        let list = node.child_by_field_name("type_parameters").or_else(|| {
            child_of_kind(
                node,
                &["type_parameters", "type_parameter_list", "type_parameter_clause", "template_parameter_list"],
            )
        });
        let Some(list) = list else {
            return Vec::new();
        };
        named_children(list)
            .into_iter()
            .filter_map(|p| {
                let text = if let Some(name) = p.child_by_field_name("name") {
                    self.text(name)
                } else if p.kind() == "lifetime" || IDENTIFIER_KINDS.contains(&p.kind()) {
                    self.text(p)
                } else if let Some(id) = find_descendant(p, &["type_identifier", "identifier", "lifetime"]) {
                    self.text(id)
                } else {
                    self.text(p)
                };
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            })
            .collect()
    }

    /// Generic function pieces: parameters, return type, type parameters and
    /// keyword modifiers
    pub fn fn_parts(&self, node: Node) -> FnParts {
        FnParts {
            params: self.params_node(node).map(|p| self.params(p)).unwrap_or_default(),
            return_type: ["return_type", "result", "returns"]
                .iter()
                .find_map(|f| node.child_by_field_name(f))
                .map(|t| clean_type(self.text(t)))
                .filter(|t| !t.is_empty()),
            type_params: self.type_params(node),
            modifiers: self.modifiers(node),
            doc: None,
        }
    }

    /// Assemble a function entity from its pieces
    pub fn function(&self, node: Node, name: String, parts: FnParts) -> UceFunction {
        let signature = signature(&name, &parts);
        let doc_comment = if self.options.doc_comments {
            parts.doc.or_else(|| self.doc(node))
        } else {
            None
        };
        UceFunction {
            signature,
            body: self.body(node),
            location: self.location(node),
            complexity: self.complexity(node),
            doc_comment,
            name,
            params: parts.params,
            return_type: parts.return_type,
            type_params: parts.type_params,
            modifiers: parts.modifiers,
        }
    }

    /// Property entity with visibility taken from modifiers
    pub fn property(&self, node: Node, name: String, property_type: Option<String>, default: Visibility) -> UceProperty {
        let mods = self.modifiers(node);
        UceProperty {
            name,
            property_type,
            visibility: visibility_from(&mods, default),
            is_static: mods.contains(Modifier::Static),
            is_readonly: mods.contains(Modifier::Readonly) || mods.contains(Modifier::Const) || mods.contains(Modifier::Final),
            is_optional: false,
            initializer: None,
            location: self.location(node),
            doc_comment: self.doc(node),
        }
    }
}

/// Wrap a function as a method, deriving flags from its modifiers
pub fn method(function: UceFunction, visibility: Visibility) -> UceMethod {
    UceMethod {
        is_static: function.modifiers.contains(Modifier::Static),
        is_abstract: function.modifiers.contains(Modifier::Abstract),
        is_getter: false,
        is_setter: false,
        visibility,
        function,
    }
}

/// Visibility from explicit keywords, else `default`
pub fn visibility_from(mods: &Modifiers, default: Visibility) -> Visibility {
    if mods.contains(Modifier::Private) {
        Visibility::Private
    } else if mods.contains(Modifier::Protected) {
        Visibility::Protected
    } else if mods.contains(Modifier::Public) {
        Visibility::Public
    } else {
        default
    }
}

/// `async name<T>(a: T, b?: U, ...rest: V): R`
pub fn signature(name: &str, parts: &FnParts) -> String {
    let mut sig = String::new();
    if parts.modifiers.contains(Modifier::Async) {
        sig.push_str("async ");
    }
    sig.push_str(name);
    if !parts.type_params.is_empty() {
        sig.push('<');
        sig.push_str(&parts.type_params.join(", "));
        sig.push('>');
    }
    let params: Vec<String> = parts
        .params
        .iter()
        .map(|p| {
            let mut s = String::new();
            if p.is_rest {
                s.push_str("...");
            }
            s.push_str(&p.name);
            if p.is_optional {
                s.push('?');
            }
            if let Some(t) = &p.param_type {
                s.push_str(": ");
                s.push_str(t);
            }
            s
        })
        .collect();
    sig.push('(');
    sig.push_str(&params.join(", "));
    sig.push(')');
    if let Some(rt) = &parts.return_type {
        sig.push_str(": ");
        sig.push_str(rt);
    }
    sig
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::parse;

    #[test]
    fn test_signature_assembly() {
        let parts = FnParts {
            params: vec![
                UceParameter {
                    name: "a".into(),
                    param_type: Some("T".into()),
                    ..Default::default()
                },
                UceParameter {
                    name: "b".into(),
                    param_type: Some("U".into()),
                    is_optional: true,
                    ..Default::default()
                },
                UceParameter {
                    name: "rest".into(),
                    is_rest: true,
                    ..Default::default()
                },
            ],
            return_type: Some("R".into()),
            type_params: vec!["T".into(), "U".into()],
            modifiers: Modifiers::new().with(Modifier::Async),
            doc: None,
        };
        assert_eq!(signature("load", &parts), "async load<T, U>(a: T, b?: U, ...rest): R");
    }

    #[test]
    fn test_module_level_skips_nested() {
        let source = "export function a() { function inner() {} }\nclass K { m() {} }\nfunction b() {}\n";
        let tree = parse(source, SupportedLanguage::TypeScript);
        let found = module_level(tree.root_node(), &["function_declaration"], &["export_statement"]);
        let options = TransformOptions::default();
        let cx = Cx::new(source, "a.ts", SupportedLanguage::TypeScript, &options);
        let names: Vec<_> = found.iter().filter_map(|n| cx.name(*n)).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_typescript_params() {
        let source = "function f(a: string, b?: number, c = 3, ...rest: any[]) {}";
        let tree = parse(source, SupportedLanguage::TypeScript);
        let options = TransformOptions::default();
        let cx = Cx::new(source, "a.ts", SupportedLanguage::TypeScript, &options);
        let func = tree.root_node().named_child(0).unwrap();
        let params = cx.params(cx.params_node(func).unwrap());

        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "rest"]);
        assert_eq!(params[0].param_type.as_deref(), Some("string"));
        assert!(params[1].is_optional);
        assert_eq!(params[2].default_value.as_deref(), Some("3"));
        assert!(params[3].is_rest);
        assert!(!params[0].is_rest);
    }

    #[test]
    fn test_go_grouped_params() {
        let source = "package p\nfunc f(a, b int, s ...string) {}\n";
        let tree = parse(source, SupportedLanguage::Go);
        let options = TransformOptions::default();
        let cx = Cx::new(source, "a.go", SupportedLanguage::Go, &options);
        let func = find_descendant(tree.root_node(), &["function_declaration"]).unwrap();
        let params = cx.params(cx.params_node(func).unwrap());

        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "s"]);
        assert_eq!(params[1].param_type.as_deref(), Some("int"));
        assert!(params[2].is_rest);
    }

    #[test]
    fn test_body_truncation() {
        let source = "def f():\n    return 'héllo'\n";
        let tree = parse(source, SupportedLanguage::Python);
        let options = TransformOptions {
            max_body_bytes: Some(26),
            ..Default::default()
        };
        let cx = Cx::new(source, "a.py", SupportedLanguage::Python, &options);
        let body = cx.body(tree.root_node().named_child(0).unwrap());
        assert!(body.len() <= 26);
        assert!(body.starts_with("def f():"));
    }

    #[test]
    fn test_underscore_visibility() {
        assert_eq!(underscore_visibility("_validate"), Visibility::Private);
        assert_eq!(underscore_visibility("__secret"), Visibility::Private);
        assert_eq!(underscore_visibility("__init__"), Visibility::Public);
        assert_eq!(underscore_visibility("get_name"), Visibility::Public);
    }
}
