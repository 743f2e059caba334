use crate::parser::GrammarStatus;
use crate::uce::EntitySummary;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: impl ToString) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

#[derive(Tabled)]
pub struct LanguageRow {
    #[tabled(rename = "Language")]
    pub language: String,
    #[tabled(rename = "Extensions")]
    pub extensions: String,
    #[tabled(rename = "Grammar")]
    pub grammar: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl LanguageRow {
    pub fn new(language: crate::SupportedLanguage, status: Option<&GrammarStatus>) -> Self {
        Self {
            language: language.as_str().to_string(),
            extensions: language.extensions().join(", "),
            grammar: crate::parser::grammar_package(language).unwrap_or("-").to_string(),
            status: match status {
                Some(GrammarStatus::Unavailable(reason)) => format!("unavailable ({})", reason),
                Some(s) => s.as_str().to_string(),
                None => "-".to_string(),
            },
        }
    }
}

#[derive(Tabled)]
pub struct EntityRow {
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Lines")]
    pub lines: String,
    #[tabled(rename = "Exported")]
    pub exported: String,
}

impl From<&EntitySummary> for EntityRow {
    fn from(summary: &EntitySummary) -> Self {
        Self {
            kind: summary.kind.as_str().to_string(),
            name: summary.name.clone(),
            lines: format!("{}-{}", summary.start_line, summary.end_line),
            exported: if summary.is_exported { "yes" } else { "" }.to_string(),
        }
    }
}

/// Rounded table of any row type
pub fn render<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn stats_table(stats: &[(&str, String)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SupportedLanguage;

    #[test]
    fn test_stats_table_contains_rows() {
        let table = stats_table(&[("Files", "3".to_string()), ("Calls", "12".to_string())]);
        assert!(table.contains("Files"));
        assert!(table.contains("12"));
        assert!(stats_table(&[]).is_empty());
    }

    #[test]
    fn test_language_row() {
        let row = LanguageRow::new(SupportedLanguage::Go, Some(&GrammarStatus::Loaded));
        assert_eq!(row.grammar, "tree-sitter-go");
        assert_eq!(row.status, "loaded");
        assert!(render(&[row]).contains("go"));
    }
}
