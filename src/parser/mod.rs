//! Grammar registry and parser lifecycle

pub mod edit;
pub mod grammar;
pub mod manager;

pub use edit::{TextEdit, TextPosition};
pub use grammar::{GrammarStatus, grammar_package, load_grammar};
pub use manager::{ParseResult, ParserManager};
