//! Text edits for incremental parsing

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tree_sitter::{InputEdit, Point};

/// Zero-based row/column position (column counted in bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextPosition {
    pub row: usize,
    pub column: usize,
}

impl TextPosition {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Position of a byte offset inside `text`
    pub fn at_offset(text: &str, offset: usize) -> Self {
        let prefix = &text.as_bytes()[..offset.min(text.len())];
        let row = prefix.iter().filter(|b| **b == b'\n').count();
        let column = match prefix.iter().rposition(|b| *b == b'\n') {
            Some(nl) => prefix.len() - nl - 1,
            None => prefix.len(),
        };
        Self { row, column }
    }
}

impl From<TextPosition> for Point {
    fn from(p: TextPosition) -> Self {
        Point::new(p.row, p.column)
    }
}

/// One byte/position delta applied to a previous tree before re-parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
    pub start_position: TextPosition,
    pub old_end_position: TextPosition,
    pub new_end_position: TextPosition,
}

impl TextEdit {
    /// Describe replacing `old_source[start..old_end]` with `new_text`
    pub fn replacement(old_source: &str, start: usize, old_end: usize, new_text: &str) -> Result<Self> {
        if start > old_end || old_end > old_source.len() {
            return Err(Error::InvalidEdit(format!(
                "range {}..{} outside source of {} bytes",
                start,
                old_end,
                old_source.len()
            )));
        }
        if !old_source.is_char_boundary(start) || !old_source.is_char_boundary(old_end) {
            return Err(Error::InvalidEdit(format!(
                "range {}..{} splits a UTF-8 character",
                start, old_end
            )));
        }

        let start_position = TextPosition::at_offset(old_source, start);
        let old_end_position = TextPosition::at_offset(old_source, old_end);

        let inserted_rows = new_text.matches('\n').count();
        let new_end_position = match new_text.rfind('\n') {
            Some(nl) => TextPosition::new(start_position.row + inserted_rows, new_text.len() - nl - 1),
            None => TextPosition::new(start_position.row, start_position.column + new_text.len()),
        };

        Ok(Self {
            start_byte: start,
            old_end_byte: old_end,
            new_end_byte: start + new_text.len(),
            start_position,
            old_end_position,
            new_end_position,
        })
    }

    /// Apply this edit's replacement to `old_source`, producing the new text
    pub fn apply(&self, old_source: &str, new_text: &str) -> String {
        let mut out = String::with_capacity(old_source.len() + new_text.len());
        out.push_str(&old_source[..self.start_byte]);
        out.push_str(new_text);
        out.push_str(&old_source[self.old_end_byte..]);
        out
    }

    pub(crate) fn to_input_edit(self) -> InputEdit {
        InputEdit {
            start_byte: self.start_byte,
            old_end_byte: self.old_end_byte,
            new_end_byte: self.new_end_byte,
            start_position: self.start_position.into(),
            old_end_position: self.old_end_position.into(),
            new_end_position: self.new_end_position.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_at_offset() {
        let text = "ab\ncde\nf";
        assert_eq!(TextPosition::at_offset(text, 0), TextPosition::new(0, 0));
        assert_eq!(TextPosition::at_offset(text, 4), TextPosition::new(1, 1));
        assert_eq!(TextPosition::at_offset(text, 7), TextPosition::new(2, 0));
    }

    #[test]
    fn test_single_line_replacement() {
        let old = "let x = 1;";
        let edit = TextEdit::replacement(old, 8, 9, "42").unwrap();
        assert_eq!(edit.new_end_byte, 10);
        assert_eq!(edit.new_end_position, TextPosition::new(0, 10));
        assert_eq!(edit.apply(old, "42"), "let x = 42;");
    }

    #[test]
    fn test_multiline_insertion() {
        let old = "a\nb";
        let edit = TextEdit::replacement(old, 1, 1, "\nxy\nz").unwrap();
        assert_eq!(edit.new_end_position, TextPosition::new(2, 1));
        assert_eq!(edit.old_end_position, TextPosition::new(0, 1));
    }

    #[test]
    fn test_invalid_range() {
        assert!(TextEdit::replacement("abc", 2, 1, "").is_err());
        assert!(TextEdit::replacement("abc", 0, 10, "").is_err());
    }
}
