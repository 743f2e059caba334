//! JSON, YAML and TOML
//!
//! Configuration files have no code entities; their top-level keys are
//! reported as constants so a config key can be found like any symbol.

use crate::transform::helpers::{Cx, child_of_kind, named_children, unquote};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::LanguageStrategy;
use crate::language::SupportedLanguage;
use crate::uce::{Modifiers, UceVariable, VariableKind};
use tree_sitter::Node;

pub struct DataStrategy(pub SupportedLanguage);

/// Scalars longer than this are not copied into the initializer
const MAX_INITIALIZER: usize = 120;

/// Value kind as a language-neutral type name
fn value_type(kind: &str) -> Option<&'static str> {
    Some(match kind {
        "object" | "block_mapping" | "flow_mapping" | "table" | "inline_table" => "object",
        "array" | "block_sequence" | "flow_sequence" | "table_array_element" => "array",
        "string" | "string_scalar" | "double_quote_scalar" | "single_quote_scalar" | "block_scalar" => "string",
        "number" | "integer" | "float" | "integer_scalar" | "float_scalar" => "number",
        "true" | "false" | "boolean" | "boolean_scalar" => "boolean",
        "null" | "null_scalar" => "null",
        "offset_date_time" | "local_date_time" | "local_date" | "local_time" => "datetime",
        _ => return None,
    })
}

/// Innermost node of a YAML value (`flow_node`/`block_node` wrappers and
/// `plain_scalar` removed)
fn unwrap_yaml(node: Node) -> Node {
    let mut current = node;
    while matches!(current.kind(), "flow_node" | "block_node" | "plain_scalar") {
        match named_children(current).into_iter().find(|c| !matches!(c.kind(), "tag" | "anchor")) {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

impl DataStrategy {
    /// Top-level key/value pairs, as (pair, key, value)
    fn pairs<'t>(&self, root: Node<'t>) -> Vec<(Node<'t>, Node<'t>, Option<Node<'t>>)> {
        match self.0 {
            SupportedLanguage::Json => child_of_kind(root, &["object"])
                .map(named_children)
                .unwrap_or_default()
                .into_iter()
                .filter(|p| p.kind() == "pair")
                .filter_map(|p| Some((p, p.child_by_field_name("key")?, p.child_by_field_name("value"))))
                .collect(),
            SupportedLanguage::Yaml => named_children(root)
                .into_iter()
                .filter(|d| d.kind() == "document")
                .flat_map(named_children)
                .map(unwrap_yaml)
                .filter(|m| matches!(m.kind(), "block_mapping" | "flow_mapping"))
                .flat_map(named_children)
                .filter(|p| self.kinds().variables.contains(&p.kind()))
                .filter_map(|p| {
                    let key = p.child_by_field_name("key")?;
                    Some((p, key, p.child_by_field_name("value").map(unwrap_yaml)))
                })
                .collect(),
            _ => named_children(root)
                .into_iter()
                .filter(|n| self.kinds().variables.contains(&n.kind()))
                .filter_map(|n| {
                    let key = child_of_kind(n, &["bare_key", "quoted_key", "dotted_key"])?;
                    let value = if n.kind() == "pair" {
                        named_children(n).into_iter().nth(1)
                    } else {
                        Some(n)
                    };
                    Some((n, key, value))
                })
                .collect(),
        }
    }

    fn variable(&self, cx: &Cx, pair: Node, key: Node, value: Option<Node>) -> UceVariable {
        let var_type = value.and_then(|v| value_type(v.kind())).map(str::to_string);
        let scalar = !matches!(var_type.as_deref(), Some("object" | "array"));
        let initializer = value
            .filter(|_| scalar)
            .map(|v| unquote(cx.text(v).trim()))
            .filter(|text| text.len() <= MAX_INITIALIZER);
        UceVariable {
            name: unquote(cx.text(unwrap_yaml(key)).trim()),
            kind: VariableKind::Const,
            var_type,
            initializer,
            location: cx.location(pair),
            modifiers: Modifiers::new(),
            doc_comment: cx.doc(pair),
        }
    }
}

impl LanguageStrategy for DataStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(self.0)
    }

    fn extract_variables(&self, cx: &Cx, root: Node) -> Vec<UceVariable> {
        self.pairs(root)
            .into_iter()
            .map(|(pair, key, value)| self.variable(cx, pair, key, value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::SupportedLanguage;
    use crate::test_support::transform;
    use crate::uce::VariableKind;

    fn keys(source: &str, lang: SupportedLanguage) -> Vec<(String, Option<String>, Option<String>)> {
        transform(source, lang)
            .variables
            .into_iter()
            .map(|v| (v.name, v.var_type, v.initializer))
            .collect()
    }

    fn entry(name: &str, ty: &str, init: Option<&str>) -> (String, Option<String>, Option<String>) {
        (name.to_string(), Some(ty.to_string()), init.map(str::to_string))
    }

    #[test]
    fn test_json_top_level_keys() {
        let source = r#"{"name": "uce", "version": 2, "private": true, "scripts": {"build": "x"}}"#;
        assert_eq!(
            keys(source, SupportedLanguage::Json),
            [
                entry("name", "string", Some("uce")),
                entry("version", "number", Some("2")),
                entry("private", "boolean", Some("true")),
                entry("scripts", "object", None),
            ]
        );
        let file = transform(source, SupportedLanguage::Json);
        assert!(file.variables.iter().all(|v| v.kind == VariableKind::Const));
        assert!(file.functions.is_empty());
    }

    #[test]
    fn test_yaml_top_level_keys() {
        let source = "name: uce\nreplicas: 3\nports:\n  - 80\n  - 443\nenv:\n  debug: false\n";
        let found = keys(source, SupportedLanguage::Yaml);
        let names: Vec<_> = found.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(names, ["name", "replicas", "ports", "env"]);
        assert_eq!(found[2].1.as_deref(), Some("array"));
        assert_eq!(found[3].1.as_deref(), Some("object"));
    }

    #[test]
    fn test_toml_pairs_and_tables() {
        let source = "title = \"demo\"\nport = 8080\n\n[server]\nhost = \"localhost\"\n\n[[plugins]]\nname = \"a\"\n";
        let found = keys(source, SupportedLanguage::Toml);
        let names: Vec<_> = found.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(names, ["title", "port", "server", "plugins"]);
        assert_eq!(found[0], entry("title", "string", Some("demo")));
        assert_eq!(found[1], entry("port", "number", Some("8080")));
        assert_eq!(found[2].1.as_deref(), Some("object"));
        assert_eq!(found[3].1.as_deref(), Some("array"));
    }
}
