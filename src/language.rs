//! Supported languages and file-extension detection
//!
//! The language set is closed: adding a variant requires an entry in
//! [`EXTENSIONS`] and a transformer strategy in `transform::languages`.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Every language the pipeline knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedLanguage {
    TypeScript,
    JavaScript,
    Tsx,
    Jsx,
    Go,
    Rust,
    Python,
    Java,
    C,
    Cpp,
    CSharp,
    Kotlin,
    Swift,
    Dart,
    Ruby,
    Php,
    Bash,
    Scala,
    Haskell,
    Elixir,
    Lua,
    Json,
    Yaml,
    Toml,
}

/// Static extension table. Extensions are matched as filename suffixes, so
/// compound entries such as `d.ts` take part in longest-match resolution.
pub const EXTENSIONS: &[(&str, SupportedLanguage)] = &[
    ("ts", SupportedLanguage::TypeScript),
    ("mts", SupportedLanguage::TypeScript),
    ("cts", SupportedLanguage::TypeScript),
    ("d.ts", SupportedLanguage::TypeScript),
    ("tsx", SupportedLanguage::Tsx),
    ("js", SupportedLanguage::JavaScript),
    ("mjs", SupportedLanguage::JavaScript),
    ("cjs", SupportedLanguage::JavaScript),
    ("jsx", SupportedLanguage::Jsx),
    ("go", SupportedLanguage::Go),
    ("rs", SupportedLanguage::Rust),
    ("py", SupportedLanguage::Python),
    ("pyi", SupportedLanguage::Python),
    ("pyw", SupportedLanguage::Python),
    ("java", SupportedLanguage::Java),
    ("c", SupportedLanguage::C),
    ("h", SupportedLanguage::C),
    ("cpp", SupportedLanguage::Cpp),
    ("cc", SupportedLanguage::Cpp),
    ("cxx", SupportedLanguage::Cpp),
    ("c++", SupportedLanguage::Cpp),
    ("hpp", SupportedLanguage::Cpp),
    ("hh", SupportedLanguage::Cpp),
    ("hxx", SupportedLanguage::Cpp),
    ("cs", SupportedLanguage::CSharp),
    ("csx", SupportedLanguage::CSharp),
    ("kt", SupportedLanguage::Kotlin),
    ("kts", SupportedLanguage::Kotlin),
    ("swift", SupportedLanguage::Swift),
    ("dart", SupportedLanguage::Dart),
    ("rb", SupportedLanguage::Ruby),
    ("rake", SupportedLanguage::Ruby),
    ("gemspec", SupportedLanguage::Ruby),
    ("ru", SupportedLanguage::Ruby),
    ("php", SupportedLanguage::Php),
    ("phtml", SupportedLanguage::Php),
    ("sh", SupportedLanguage::Bash),
    ("bash", SupportedLanguage::Bash),
    ("zsh", SupportedLanguage::Bash),
    ("scala", SupportedLanguage::Scala),
    ("sc", SupportedLanguage::Scala),
    ("hs", SupportedLanguage::Haskell),
    ("lhs", SupportedLanguage::Haskell),
    ("ex", SupportedLanguage::Elixir),
    ("exs", SupportedLanguage::Elixir),
    ("lua", SupportedLanguage::Lua),
    ("json", SupportedLanguage::Json),
    ("jsonc", SupportedLanguage::Json),
    ("yaml", SupportedLanguage::Yaml),
    ("yml", SupportedLanguage::Yaml),
    ("toml", SupportedLanguage::Toml),
];

/// Well-known extensionless (or dot-prefixed) file names.
const FILE_NAMES: &[(&str, SupportedLanguage)] = &[
    ("Rakefile", SupportedLanguage::Ruby),
    ("Gemfile", SupportedLanguage::Ruby),
    ("Podfile", SupportedLanguage::Ruby),
    (".bashrc", SupportedLanguage::Bash),
    (".bash_profile", SupportedLanguage::Bash),
    (".zshrc", SupportedLanguage::Bash),
    (".profile", SupportedLanguage::Bash),
];

impl SupportedLanguage {
    /// Get the string representation of the language
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedLanguage::TypeScript => "typescript",
            SupportedLanguage::JavaScript => "javascript",
            SupportedLanguage::Tsx => "tsx",
            SupportedLanguage::Jsx => "jsx",
            SupportedLanguage::Go => "go",
            SupportedLanguage::Rust => "rust",
            SupportedLanguage::Python => "python",
            SupportedLanguage::Java => "java",
            SupportedLanguage::C => "c",
            SupportedLanguage::Cpp => "cpp",
            SupportedLanguage::CSharp => "csharp",
            SupportedLanguage::Kotlin => "kotlin",
            SupportedLanguage::Swift => "swift",
            SupportedLanguage::Dart => "dart",
            SupportedLanguage::Ruby => "ruby",
            SupportedLanguage::Php => "php",
            SupportedLanguage::Bash => "bash",
            SupportedLanguage::Scala => "scala",
            SupportedLanguage::Haskell => "haskell",
            SupportedLanguage::Elixir => "elixir",
            SupportedLanguage::Lua => "lua",
            SupportedLanguage::Json => "json",
            SupportedLanguage::Yaml => "yaml",
            SupportedLanguage::Toml => "toml",
        }
    }

    /// Get all supported languages
    pub fn all() -> &'static [SupportedLanguage] {
        &[
            SupportedLanguage::TypeScript,
            SupportedLanguage::JavaScript,
            SupportedLanguage::Tsx,
            SupportedLanguage::Jsx,
            SupportedLanguage::Go,
            SupportedLanguage::Rust,
            SupportedLanguage::Python,
            SupportedLanguage::Java,
            SupportedLanguage::C,
            SupportedLanguage::Cpp,
            SupportedLanguage::CSharp,
            SupportedLanguage::Kotlin,
            SupportedLanguage::Swift,
            SupportedLanguage::Dart,
            SupportedLanguage::Ruby,
            SupportedLanguage::Php,
            SupportedLanguage::Bash,
            SupportedLanguage::Scala,
            SupportedLanguage::Haskell,
            SupportedLanguage::Elixir,
            SupportedLanguage::Lua,
            SupportedLanguage::Json,
            SupportedLanguage::Yaml,
            SupportedLanguage::Toml,
        ]
    }

    /// Extensions registered for this language
    pub fn extensions(&self) -> Vec<&'static str> {
        EXTENSIONS
            .iter()
            .filter(|(_, lang)| lang == self)
            .map(|(ext, _)| *ext)
            .collect()
    }

    /// TypeScript/JavaScript family (anonymous function values bound to names)
    pub fn is_js_family(&self) -> bool {
        matches!(
            self,
            SupportedLanguage::TypeScript
                | SupportedLanguage::JavaScript
                | SupportedLanguage::Tsx
                | SupportedLanguage::Jsx
        )
    }

    /// Pure data formats: no functions or classes, only top-level keys
    pub fn is_data(&self) -> bool {
        matches!(
            self,
            SupportedLanguage::Json | SupportedLanguage::Yaml | SupportedLanguage::Toml
        )
    }
}

impl FromStr for SupportedLanguage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "typescript" | "ts" => Ok(SupportedLanguage::TypeScript),
            "javascript" | "js" | "node" => Ok(SupportedLanguage::JavaScript),
            "tsx" => Ok(SupportedLanguage::Tsx),
            "jsx" => Ok(SupportedLanguage::Jsx),
            "go" | "golang" => Ok(SupportedLanguage::Go),
            "rust" | "rs" => Ok(SupportedLanguage::Rust),
            "python" | "py" => Ok(SupportedLanguage::Python),
            "java" => Ok(SupportedLanguage::Java),
            "c" => Ok(SupportedLanguage::C),
            "cpp" | "c++" | "cxx" => Ok(SupportedLanguage::Cpp),
            "csharp" | "c#" | "cs" => Ok(SupportedLanguage::CSharp),
            "kotlin" | "kt" => Ok(SupportedLanguage::Kotlin),
            "swift" => Ok(SupportedLanguage::Swift),
            "dart" => Ok(SupportedLanguage::Dart),
            "ruby" | "rb" => Ok(SupportedLanguage::Ruby),
            "php" => Ok(SupportedLanguage::Php),
            "bash" | "sh" | "shell" => Ok(SupportedLanguage::Bash),
            "scala" => Ok(SupportedLanguage::Scala),
            "haskell" | "hs" => Ok(SupportedLanguage::Haskell),
            "elixir" | "ex" => Ok(SupportedLanguage::Elixir),
            "lua" => Ok(SupportedLanguage::Lua),
            "json" => Ok(SupportedLanguage::Json),
            "yaml" | "yml" => Ok(SupportedLanguage::Yaml),
            "toml" => Ok(SupportedLanguage::Toml),
            _ => Err(Error::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl std::fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Detect the language of a file from its name.
///
/// Extensions are compared case-insensitively as suffixes of the file name;
/// when several entries match, the longest one wins.
pub fn detect_language(path: impl AsRef<Path>) -> Option<SupportedLanguage> {
    let file_name = path.as_ref().file_name()?.to_str()?;

    if let Some((_, lang)) = FILE_NAMES.iter().find(|(name, _)| *name == file_name) {
        return Some(*lang);
    }

    let lower = file_name.to_lowercase();
    EXTENSIONS
        .iter()
        .filter(|(ext, _)| {
            lower.len() > ext.len() + 1
                && lower.ends_with(ext)
                && lower.as_bytes()[lower.len() - ext.len() - 1] == b'.'
        })
        .max_by_key(|(ext, _)| ext.len())
        .map(|(_, lang)| *lang)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_roundtrip() {
        for (ext, lang) in EXTENSIONS {
            let path = format!("src/some_file.{}", ext);
            assert_eq!(detect_language(&path), Some(*lang), "extension {}", ext);
        }
    }

    #[test]
    fn test_language_name_roundtrip() {
        for lang in SupportedLanguage::all() {
            let parsed: SupportedLanguage = lang.as_str().parse().unwrap();
            assert_eq!(*lang, parsed);
        }
        assert_eq!(SupportedLanguage::all().len(), 24);
    }

    #[test]
    fn test_longest_suffix_wins() {
        assert_eq!(detect_language("build.gradle.kts"), Some(SupportedLanguage::Kotlin));
        assert_eq!(detect_language("Main.kt"), Some(SupportedLanguage::Kotlin));
        assert_eq!(detect_language("types.d.ts"), Some(SupportedLanguage::TypeScript));
        assert_eq!(detect_language("App.TSX"), Some(SupportedLanguage::Tsx));
    }

    #[test]
    fn test_special_file_names() {
        assert_eq!(detect_language("project/Rakefile"), Some(SupportedLanguage::Ruby));
        assert_eq!(detect_language("/home/me/.bashrc"), Some(SupportedLanguage::Bash));
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(detect_language("notes.txt"), None);
        assert_eq!(detect_language("Makefile"), None);
        assert_eq!(detect_language(".ts"), None);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(SupportedLanguage::from_str("c#").unwrap(), SupportedLanguage::CSharp);
        assert_eq!(SupportedLanguage::from_str("golang").unwrap(), SupportedLanguage::Go);
        assert!(SupportedLanguage::from_str("cobol").is_err());
    }
}
