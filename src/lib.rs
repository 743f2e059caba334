//! # UCE - Universal Code Entity extraction
//!
//! Language-agnostic structural extraction for heterogeneous source files.
//!
//! UCE provides:
//! - Grammar lifecycle management and syntax-tree production (full and incremental)
//! - Transformation of tree-sitter CSTs into the unified UCE schema
//! - Call-site extraction with caller → callee / callee → caller indexes
//! - A parallel batch driver for analyzing whole directories

pub mod language;
pub mod parser;
pub mod uce;
pub mod transform;
pub mod calls;
pub mod batch;
pub mod walk;
pub mod config;
pub mod output;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenient access
pub use language::{detect_language, SupportedLanguage};
pub use parser::{ParseResult, ParserManager, TextEdit};
pub use uce::{UceFile, UceFunction, UceClass, UceInterface, Modifier, Modifiers, Visibility};
pub use transform::{AstTransformer, TransformOptions};
pub use calls::{CallExtractor, FileCallGraph, FunctionCall};

/// Result type alias for UCE operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for UCE operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parser manager not initialized: call initialize() before parsing")]
    NotInitialized,

    #[error("No parser available for language: {0}")]
    ParserUnavailable(SupportedLanguage),

    #[error("Parse failure ({0}): grammar engine returned no tree")]
    ParseFailure(SupportedLanguage),

    #[error("Unsupported language or file type: {0}")]
    UnsupportedLanguage(String),

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Message sent from parallel batch workers to the coordinator
#[derive(Debug)]
pub enum AnalysisMessage {
    Analyzed(Box<batch::FileAnalysis>),
    Failed { path: String, error: String },
}
