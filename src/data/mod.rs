pub mod loader;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Date parse error: {0}")]
    DateParse(#[from] chrono::ParseError),
    #[error("Invalid or missing value in column '{column}' at row {row}")]
    InvalidValue { column: String, row: usize },
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Input table has no rows")]
    EmptyTable,
}

pub type Result<T> = std::result::Result<T, DataError>;

/// Recognized provider spellings mapped to the canonical lower-case column
/// vocabulary. Applied once at ingestion; anything not listed passes through
/// untouched.
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("date", "date"),
    ("timestamp", "date"),
    ("datetime", "date"),
    ("open", "open"),
    ("high", "high"),
    ("low", "low"),
    ("close", "close"),
    ("closing price", "close"),
    ("volume", "volume"),
    ("vol", "volume"),
    ("adj close", "adj_close"),
    ("adj_close", "adj_close"),
    ("adjclose", "adj_close"),
    ("adjusted close", "adj_close"),
    ("adjusted_close", "adj_close"),
];

/// Canonical name for a source column header, or the header unchanged when it
/// is not in the alias table.
pub fn canonical_column(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    for (alias, canonical) in COLUMN_ALIASES {
        if lowered == *alias {
            return (*canonical).to_string();
        }
    }
    name.trim().to_string()
}

/// Raw tabular price data as handed over by the acquisition layer. Headers
/// are canonicalized at construction; cells stay untyped until a
/// `PriceSeries` is built from the table.
#[derive(Debug, Clone)]
pub struct PriceTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl PriceTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns = columns.iter().map(|c| canonical_column(c)).collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a canonical column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (row, canonical column). Empty cells count as absent.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        let cell = self.rows.get(row)?.get(idx)?.trim();
        if cell.is_empty() {
            None
        } else {
            Some(cell)
        }
    }
}
