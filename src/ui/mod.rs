//! Terminal output: theme, icons, tables and scan progress

pub mod icons;
pub mod output;
pub mod progress;
pub mod progress_message;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{call_edge, error, header, info, section, success, summary_row, timing, warn};
pub use progress::{ProgressManager, Spinner};
pub use progress_message::{ProgressMessage, ProgressPhase};
pub use table::{EntityRow, LanguageRow, TableBuilder, render, stats_table};
pub use theme::{theme, ColorChoice, Theme};
