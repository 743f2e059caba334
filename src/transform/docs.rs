//! Doc-comment association
//!
//! A declaration's doc comment is the nearest comment sibling ending on the
//! same line or the line before it. Attributes and decorators between the two
//! are skipped, and a run of adjacent line comments is joined.

use super::helpers::{is_comment, named_children};
use regex::Regex;
use std::sync::OnceLock;
use tree_sitter::Node;

/// Containers that hold a declaration without being the thing documented
const ANCHOR_WRAPPERS: &[&str] = &[
    "export_statement",
    "decorated_definition",
    "template_declaration",
    "ambient_declaration",
];

const ATTRIBUTE_KINDS: &[&str] = &[
    "attribute_item",
    "inner_attribute_item",
    "decorator",
    "annotation",
    "marker_annotation",
    "attribute_list",
    "attribute",
];

fn leading_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:/\*+!?|\*+/|\*|//[/!]?|#+!?|--+(?:\[=*\[)?\s*[|^]?|\{-+\s*\|?|;+|%+)\s?")
            .unwrap_or_else(|e| panic!("invalid comment regex: {e}"))
    })
}

fn trailing_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\s*(?:\*+/|-+\}|\]=*\])\s*$").unwrap_or_else(|e| panic!("invalid comment regex: {e}"))
    })
}

/// Strip comment markers and surrounding blank lines
pub fn clean_comment(raw: &str) -> String {
    let lines: Vec<String> = raw
        .lines()
        .map(|line| {
            let line = trailing_marker().replace(line, "");
            leading_marker().replace(&line, "").trim_end().to_string()
        })
        .collect();

    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(s), Some(e)) => lines[s..=e].join("\n"),
        _ => String::new(),
    }
}

/// Contents of a string literal used as documentation, without quotes or
/// common indentation
pub fn clean_docstring(raw: &str) -> String {
    let t = raw.trim().trim_start_matches(['r', 'R', 'u', 'U', 'b', 'B', 'f', 'F']);
    let inner = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find(|q| t.len() >= 2 * q.len() && t.starts_with(*q) && t.ends_with(*q))
        .map(|q| &t[q.len()..t.len() - q.len()])
        .unwrap_or(t);

    let lines: Vec<&str> = inner.lines().map(str::trim).collect();
    let start = lines.iter().position(|l| !l.is_empty());
    let end = lines.iter().rposition(|l| !l.is_empty());
    match (start, end) {
        (Some(s), Some(e)) => lines[s..=e].join("\n"),
        _ => String::new(),
    }
}

fn is_block_comment(text: &str) -> bool {
    let t = text.trim_start();
    t.starts_with("/*") || t.starts_with("{-") || t.starts_with("--[") || t.starts_with("\"\"\"")
}

/// True when `comment` trails code on the same line (`x = 1 // note`)
fn is_trailing(comment: Node) -> bool {
    comment
        .prev_sibling()
        .is_some_and(|p| !is_comment(p) && p.end_position().row == comment.start_position().row)
}

/// Doc comment attached to `node`
pub fn preceding_comment(source: &str, node: Node) -> Option<String> {
    let mut anchor = node;
    while let Some(parent) = anchor.parent() {
        if ANCHOR_WRAPPERS.contains(&parent.kind()) {
            anchor = parent;
        } else {
            break;
        }
    }

    let mut next_row = anchor.start_position().row;
    let mut prev = anchor.prev_sibling();
    while let Some(p) = prev {
        if ATTRIBUTE_KINDS.contains(&p.kind()) {
            next_row = p.start_position().row;
            prev = p.prev_sibling();
        } else {
            break;
        }
    }

    let first = prev.filter(|p| is_comment(*p))?;
    if last_row(first) + 1 < next_row || is_trailing(first) {
        return None;
    }

    let text_of = |n: Node| n.utf8_text(source.as_bytes()).unwrap_or("").trim_end().to_string();
    let first_text = text_of(first);
    if is_block_comment(&first_text) {
        let cleaned = clean_comment(&first_text);
        return (!cleaned.is_empty()).then_some(cleaned);
    }

    let mut run = vec![first_text];
    let mut current = first;
    while let Some(p) = current.prev_sibling() {
        if !is_comment(p) || is_trailing(p) || last_row(p) + 1 < current.start_position().row {
            break;
        }
        let text = text_of(p);
        if is_block_comment(&text) {
            break;
        }
        run.push(text);
        current = p;
    }
    run.reverse();

    let cleaned = clean_comment(&run.join("\n"));
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Row of the last character; some grammars end line comments after the newline
fn last_row(node: Node) -> usize {
    let end = node.end_position();
    if end.column == 0 && end.row > node.start_position().row {
        end.row - 1
    } else {
        end.row
    }
}

/// Python-style docstring: a string literal as the first statement of `body`
pub fn docstring(source: &str, body: Node) -> Option<String> {
    let first = named_children(body).into_iter().next()?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = named_children(first).into_iter().next()?;
    if expr.kind() != "string" && expr.kind() != "concatenated_string" {
        return None;
    }
    let doc = clean_docstring(expr.utf8_text(source.as_bytes()).ok()?);
    (!doc.is_empty()).then_some(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SupportedLanguage;
    use crate::test_support::parse;
    use crate::transform::helpers::find_descendant;

    fn doc_for(source: &str, lang: SupportedLanguage, kind: &str) -> Option<String> {
        let tree = parse(source, lang);
        let node = find_descendant(tree.root_node(), &[kind]).unwrap();
        preceding_comment(source, node)
    }

    #[test]
    fn test_clean_block_comment() {
        let raw = "/**\n * Loads the user.\n * @param id user id\n */";
        assert_eq!(clean_comment(raw), "Loads the user.\n@param id user id");
    }

    #[test]
    fn test_clean_line_comments() {
        assert_eq!(clean_comment("/// Adds two numbers\n/// together"), "Adds two numbers\ntogether");
        assert_eq!(clean_comment("# hello"), "hello");
        assert_eq!(clean_comment("-- | Haddock"), "Haddock");
    }

    #[test]
    fn test_clean_docstring() {
        assert_eq!(clean_docstring("\"\"\"\n    Summary.\n\n    More.\n    \"\"\""), "Summary.\n\nMore.");
        assert_eq!(clean_docstring("'single'"), "single");
    }

    #[test]
    fn test_jsdoc_through_export() {
        let source = "/** Adds. */\nexport function add(a, b) { return a + b; }\n";
        let doc = doc_for(source, SupportedLanguage::TypeScript, "function_declaration");
        assert_eq!(doc.as_deref(), Some("Adds."));
    }

    #[test]
    fn test_rust_doc_skips_attributes() {
        let source = "/// A point.\n/// In 2D.\n#[derive(Debug)]\nstruct Point { x: i32 }\n";
        let doc = doc_for(source, SupportedLanguage::Rust, "struct_item");
        assert_eq!(doc.as_deref(), Some("A point.\nIn 2D."));
    }

    #[test]
    fn test_rust_line_comment_run_is_single_spaced() {
        let doc = doc_for("/// a\n/// b\nfn g() {}\n", SupportedLanguage::Rust, "function_item");
        assert_eq!(doc.as_deref(), Some("a\nb"));
    }

    #[test]
    fn test_rust_blank_line_splits_comment_runs() {
        let doc = doc_for("// header\n\n/// Runs.\nfn g() {}\n", SupportedLanguage::Rust, "function_item");
        assert_eq!(doc.as_deref(), Some("Runs."));
        let detached = doc_for("/// stray\n\nfn g() {}\n", SupportedLanguage::Rust, "function_item");
        assert_eq!(detached, None);
    }

    #[test]
    fn test_detached_comment_is_ignored() {
        let source = "// unrelated\n\nfunction f() {}\n";
        assert_eq!(doc_for(source, SupportedLanguage::JavaScript, "function_declaration"), None);
    }

    #[test]
    fn test_trailing_comment_is_ignored() {
        let source = "let x = 1; // about x\nfunction f() {}\n";
        assert_eq!(doc_for(source, SupportedLanguage::JavaScript, "function_declaration"), None);
    }
}
