//! Grammar registry
//!
//! Maps each [`SupportedLanguage`] to the compiled tree-sitter grammar linked
//! into the binary. Languages without a grammar crate resolve to `None` and are
//! reported as unavailable by the manager.

use crate::language::SupportedLanguage;
use tree_sitter::Language;

/// Load status of a single grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarStatus {
    /// Grammar loaded and a parser handle is ready
    Loaded,
    /// Grammar could not be loaded; the language is not analyzable
    Unavailable(String),
    /// Excluded by configuration; loaded on first use
    Deferred,
}

impl GrammarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrammarStatus::Loaded => "loaded",
            GrammarStatus::Unavailable(_) => "unavailable",
            GrammarStatus::Deferred => "deferred",
        }
    }
}

/// Package that provides the grammar for a language.
///
/// This is the language → package half of grammar resolution; the package is
/// statically linked, so the binary half is the crate's `LANGUAGE` constant.
pub fn grammar_package(language: SupportedLanguage) -> Option<&'static str> {
    use SupportedLanguage::*;
    let package = match language {
        TypeScript | Tsx => "tree-sitter-typescript",
        JavaScript | Jsx => "tree-sitter-javascript",
        Go => "tree-sitter-go",
        Rust => "tree-sitter-rust",
        Python => "tree-sitter-python",
        Java => "tree-sitter-java",
        C => "tree-sitter-c",
        Cpp => "tree-sitter-cpp",
        CSharp => "tree-sitter-c-sharp",
        Kotlin => "tree-sitter-kotlin-ng",
        Swift => "tree-sitter-swift",
        Ruby => "tree-sitter-ruby",
        Php => "tree-sitter-php",
        Bash => "tree-sitter-bash",
        Scala => "tree-sitter-scala",
        Haskell => "tree-sitter-haskell",
        Elixir => "tree-sitter-elixir",
        Lua => "tree-sitter-lua",
        Json => "tree-sitter-json",
        Yaml => "tree-sitter-yaml",
        Toml => "tree-sitter-toml-ng",
        Dart => return None,
    };
    Some(package)
}

/// Resolve the compiled grammar for a language
pub fn load_grammar(language: SupportedLanguage) -> Option<Language> {
    use SupportedLanguage::*;
    let grammar: Language = match language {
        TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        // The javascript grammar parses JSX natively
        JavaScript | Jsx => tree_sitter_javascript::LANGUAGE.into(),
        Go => tree_sitter_go::LANGUAGE.into(),
        Rust => tree_sitter_rust::LANGUAGE.into(),
        Python => tree_sitter_python::LANGUAGE.into(),
        Java => tree_sitter_java::LANGUAGE.into(),
        C => tree_sitter_c::LANGUAGE.into(),
        Cpp => tree_sitter_cpp::LANGUAGE.into(),
        CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        Kotlin => tree_sitter_kotlin_ng::LANGUAGE.into(),
        Swift => tree_sitter_swift::LANGUAGE.into(),
        Ruby => tree_sitter_ruby::LANGUAGE.into(),
        Php => tree_sitter_php::LANGUAGE_PHP.into(),
        Bash => tree_sitter_bash::LANGUAGE.into(),
        Scala => tree_sitter_scala::LANGUAGE.into(),
        Haskell => tree_sitter_haskell::LANGUAGE.into(),
        Elixir => tree_sitter_elixir::LANGUAGE.into(),
        Lua => tree_sitter_lua::LANGUAGE.into(),
        Json => tree_sitter_json::LANGUAGE.into(),
        Yaml => tree_sitter_yaml::LANGUAGE.into(),
        Toml => tree_sitter_toml_ng::LANGUAGE.into(),
        Dart => return None,
    };
    Some(grammar)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_table_matches_grammars() {
        for lang in SupportedLanguage::all() {
            assert_eq!(
                grammar_package(*lang).is_some(),
                load_grammar(*lang).is_some(),
                "{}",
                lang
            );
        }
    }

    #[test]
    fn test_dart_has_no_grammar() {
        assert!(load_grammar(SupportedLanguage::Dart).is_none());
        assert!(grammar_package(SupportedLanguage::Dart).is_none());
    }
}
