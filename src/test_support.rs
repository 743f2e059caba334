//! Helpers shared by unit tests

use crate::calls::{CallExtractor, FileCallGraph};
use crate::language::SupportedLanguage;
use crate::parser::load_grammar;
use crate::transform::AstTransformer;
use crate::uce::UceFile;
use tree_sitter::{Parser, Tree};

pub fn parse(source: &str, language: SupportedLanguage) -> Tree {
    let grammar = load_grammar(language).unwrap_or_else(|| panic!("no grammar for {}", language));
    let mut parser = Parser::new();
    parser.set_language(&grammar).unwrap();
    parser.parse(source, None).unwrap()
}

pub fn file_path(language: SupportedLanguage) -> String {
    let ext = language.extensions().first().copied().unwrap_or("txt");
    format!("test.{}", ext)
}

pub fn transform(source: &str, language: SupportedLanguage) -> UceFile {
    let tree = parse(source, language);
    AstTransformer::default().transform(&tree, source, &file_path(language), language)
}

pub fn call_graph(source: &str, language: SupportedLanguage) -> FileCallGraph {
    let tree = parse(source, language);
    CallExtractor::new().extract_from_tree_as(&tree, source, &file_path(language), language)
}

pub fn uce_call_graph(source: &str, language: SupportedLanguage) -> FileCallGraph {
    let tree = parse(source, language);
    let path = file_path(language);
    let file = AstTransformer::default().transform(&tree, source, &path, language);
    let calls = CallExtractor::new().extract_from_uce(&file, &tree, source);
    FileCallGraph::from_calls(&path, calls)
}
