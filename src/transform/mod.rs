//! CST → UCE transformation
//!
//! [`AstTransformer::transform`] dispatches to a per-language
//! [`LanguageStrategy`] and assembles the results into a [`UceFile`]. A
//! transform is a pure function of its inputs: the same tree, source, path
//! and language always give an equal `UceFile`.

pub mod complexity;
pub mod docs;
pub mod helpers;
pub mod kinds;
pub mod languages;
pub mod strategy;

use crate::language::SupportedLanguage;
use crate::parser::ParseResult;
use crate::uce::{Severity, UceFile, UceParseError};
use helpers::{Cx, children};
use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Tree};

pub use strategy::LanguageStrategy;

/// Knobs shared by every strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Keep declaration source text in `body`
    pub include_bodies: bool,
    /// Truncate bodies to this many bytes
    pub max_body_bytes: Option<usize>,
    pub doc_comments: bool,
    /// When off, every complexity is reported as 1
    pub complexity: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            include_bodies: true,
            max_body_bytes: None,
            doc_comments: true,
            complexity: true,
        }
    }
}

/// Strategy for a language
pub fn strategy_for(language: SupportedLanguage) -> &'static dyn LanguageStrategy {
    languages::strategy(language)
}

#[derive(Debug, Clone, Default)]
pub struct AstTransformer {
    options: TransformOptions,
}

impl AstTransformer {
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    pub fn transform(&self, tree: &Tree, source: &str, file_path: &str, language: SupportedLanguage) -> UceFile {
        let cx = Cx::new(source, file_path, language, &self.options);
        let root = tree.root_node();
        let strategy = strategy_for(language);

        let mut file = UceFile::new(file_path, language);
        file.functions = strategy.extract_functions(&cx, root);
        file.classes = strategy.extract_classes(&cx, root);
        file.interfaces = strategy.extract_interfaces(&cx, root);
        file.type_aliases = strategy.extract_type_aliases(&cx, root);
        file.variables = strategy.extract_variables(&cx, root);
        file.imports = strategy.extract_imports(&cx, root);
        file.exports = strategy.extract_exports(&cx, root);
        file.errors = collect_errors(&cx, root);

        tracing::debug!(
            "Transformed {} ({}): {} functions, {} classes, {} interfaces, {} errors",
            file_path,
            language,
            file.functions.len(),
            file.classes.len(),
            file.interfaces.len(),
            file.errors.len()
        );
        file
    }

    /// Transform the output of a parse
    pub fn transform_parsed(&self, parsed: &ParseResult, file_path: &str) -> UceFile {
        self.transform(&parsed.tree, &parsed.source_code, file_path, parsed.language)
    }
}

/// One parse error per ERROR or MISSING node, in document order
fn collect_errors(cx: &Cx, root: Node) -> Vec<UceParseError> {
    let mut errors = Vec::new();
    if !root.has_error() {
        return errors;
    }

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() {
            let snippet: String = cx.text(node).chars().take(40).collect();
            let message = if snippet.trim().is_empty() {
                "Syntax error".to_string()
            } else {
                format!("Syntax error near `{}`", snippet.trim())
            };
            errors.push(UceParseError {
                message,
                location: cx.location(node),
                severity: Severity::Error,
            });
            continue;
        }
        if node.is_missing() {
            errors.push(UceParseError {
                message: format!("Missing `{}`", node.kind()),
                location: cx.location(node),
                severity: Severity::Error,
            });
            continue;
        }
        if node.has_error() {
            stack.extend(children(node).into_iter().rev());
        }
    }
    errors
}
