//! Parser manager
//!
//! Owns one tree-sitter parser handle per language. Handles are created by
//! [`ParserManager::initialize`] and released by [`ParserManager::close`]; the
//! manager is an ordinary value, so each worker thread can own its own.

use super::edit::TextEdit;
use super::grammar::{GrammarStatus, load_grammar};
use crate::config::ParserConfig;
use crate::language::{SupportedLanguage, detect_language};
use crate::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Instant;
use tree_sitter::{Parser, Tree};

/// Output of a full or incremental parse.
///
/// The tree belongs to the caller. Keep it only if it will be fed back into
/// [`ParserManager::incremental_parse`].
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub tree: Tree,
    pub source_code: String,
    pub language: SupportedLanguage,
    pub parse_time_ms: f64,
    /// Read from the root node's error flag
    pub has_errors: bool,
}

/// A loaded parser plus the last tree it produced
struct ParserHandle {
    parser: Parser,
    last_tree: Option<Tree>,
}

impl ParserHandle {
    fn load(language: SupportedLanguage) -> std::result::Result<Self, String> {
        let grammar = load_grammar(language)
            .ok_or_else(|| format!("no grammar linked for {}", language))?;
        let mut parser = Parser::new();
        parser.set_language(&grammar).map_err(|e| e.to_string())?;
        Ok(Self {
            parser,
            last_tree: None,
        })
    }
}

pub struct ParserManager {
    config: ParserConfig,
    handles: HashMap<SupportedLanguage, ParserHandle>,
    status: BTreeMap<SupportedLanguage, GrammarStatus>,
    initialized: bool,
}

impl ParserManager {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            handles: HashMap::new(),
            status: BTreeMap::new(),
            initialized: false,
        }
    }

    /// Load every grammar allowed by the configuration.
    ///
    /// Calling this again is a no-op. Grammars that fail to load are recorded
    /// as unavailable and never abort initialization.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }

        for &language in SupportedLanguage::all() {
            if !self.config.loads_eagerly(language) {
                self.status.insert(language, GrammarStatus::Deferred);
                continue;
            }
            self.load(language);
        }
        self.initialized = true;

        let unavailable = self.unavailable_languages();
        tracing::info!(
            "Parser manager ready: {} grammars loaded, {} unavailable",
            self.handles.len(),
            unavailable.len()
        );
    }

    fn load(&mut self, language: SupportedLanguage) -> bool {
        match ParserHandle::load(language) {
            Ok(handle) => {
                self.handles.insert(language, handle);
                self.status.insert(language, GrammarStatus::Loaded);
                true
            }
            Err(reason) => {
                tracing::warn!("Grammar for {} unavailable: {}", language, reason);
                self.status.insert(language, GrammarStatus::Unavailable(reason));
                false
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether `language` can be parsed (deferred grammars count as available)
    pub fn has_parser(&self, language: SupportedLanguage) -> bool {
        matches!(
            self.status.get(&language),
            Some(GrammarStatus::Loaded | GrammarStatus::Deferred)
        )
    }

    pub fn status(&self, language: SupportedLanguage) -> Option<&GrammarStatus> {
        self.status.get(&language)
    }

    /// Languages with a loaded parser handle
    pub fn available_languages(&self) -> Vec<SupportedLanguage> {
        self.status
            .iter()
            .filter(|(_, s)| **s == GrammarStatus::Loaded)
            .map(|(lang, _)| *lang)
            .collect()
    }

    /// Languages whose grammar failed to load, with the reason
    pub fn unavailable_languages(&self) -> Vec<(SupportedLanguage, String)> {
        self.status
            .iter()
            .filter_map(|(lang, s)| match s {
                GrammarStatus::Unavailable(reason) => Some((*lang, reason.clone())),
                _ => None,
            })
            .collect()
    }

    fn handle_mut(&mut self, language: SupportedLanguage) -> Result<&mut ParserHandle> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        if self.status.get(&language) == Some(&GrammarStatus::Deferred) {
            tracing::debug!("Loading deferred grammar for {}", language);
            self.load(language);
        }
        self.handles
            .get_mut(&language)
            .ok_or(Error::ParserUnavailable(language))
    }

    /// Parse a complete source buffer.
    ///
    /// Syntactically invalid input still produces a tree; `has_errors` reports
    /// whether the grammar had to recover.
    pub fn parse_code(&mut self, source: &str, language: SupportedLanguage) -> Result<ParseResult> {
        let handle = self.handle_mut(language)?;

        let started = Instant::now();
        let tree = handle
            .parser
            .parse(source, None)
            .ok_or(Error::ParseFailure(language))?;
        let parse_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        handle.last_tree = Some(tree.clone());
        Ok(Self::result(tree, source, language, parse_time_ms))
    }

    /// Detect the language from `path` and parse `source`
    pub fn parse_file(&mut self, path: impl AsRef<Path>, source: &str) -> Result<ParseResult> {
        let path = path.as_ref();
        let language = detect_language(path)
            .ok_or_else(|| Error::UnsupportedLanguage(path.display().to_string()))?;
        self.parse_code(source, language)
    }

    /// Re-parse `new_source` reusing `old_tree`.
    ///
    /// The edits are applied to a copy of `old_tree`; the caller's tree is left
    /// untouched. Edits must describe how the old text became `new_source`.
    pub fn incremental_parse(
        &mut self,
        old_tree: &Tree,
        new_source: &str,
        edits: &[TextEdit],
        language: SupportedLanguage,
    ) -> Result<ParseResult> {
        if let Some(edit) = edits.iter().find(|e| e.new_end_byte > new_source.len()) {
            return Err(Error::InvalidEdit(format!(
                "edit ends at byte {} but new source has {} bytes",
                edit.new_end_byte,
                new_source.len()
            )));
        }

        let handle = self.handle_mut(language)?;

        let mut edited = old_tree.clone();
        for edit in edits {
            edited.edit(&edit.to_input_edit());
        }

        let started = Instant::now();
        let tree = handle
            .parser
            .parse(new_source, Some(&edited))
            .ok_or(Error::ParseFailure(language))?;
        let parse_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        handle.last_tree = Some(tree.clone());
        Ok(Self::result(tree, new_source, language, parse_time_ms))
    }

    /// Last tree produced by the handle for `language`
    pub fn last_tree(&self, language: SupportedLanguage) -> Option<&Tree> {
        self.handles.get(&language)?.last_tree.as_ref()
    }

    /// Release every parser handle. The manager must be re-initialized before
    /// it can parse again.
    pub fn close(&mut self) {
        let released = self.handles.len();
        self.handles.clear();
        self.status.clear();
        self.initialized = false;
        tracing::debug!("Released {} parser handles", released);
    }

    fn result(tree: Tree, source: &str, language: SupportedLanguage, parse_time_ms: f64) -> ParseResult {
        let has_errors = tree.root_node().has_error();
        ParseResult {
            tree,
            source_code: source.to_string(),
            language,
            parse_time_ms,
            has_errors,
        }
    }
}

impl Default for ParserManager {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl Drop for ParserManager {
    fn drop(&mut self) {
        if self.initialized {
            self.close();
        }
    }
}
