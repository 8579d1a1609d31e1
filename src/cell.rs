//! Scalar cells of a flattened output row.

use serde_json::Number;
use std::fmt;

/// Column delimiter of every emitted row, header rows included.
pub const DELIMITER: &str = "|";

/// One scalar value in an output row.
///
/// Cells are written verbatim: embedded delimiters are not escaped.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Null,
    Text(String),
    Number(Number),
    Bool(bool),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// `count` null cells.
    pub fn nulls(count: usize) -> Vec<Cell> {
        vec![Cell::Null; count]
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<Option<&str>> for Cell {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Cell::Null, Cell::from)
    }
}

impl From<Option<&String>> for Cell {
    fn from(value: Option<&String>) -> Self {
        value.map_or(Cell::Null, |s| Cell::Text(s.clone()))
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map_or(Cell::Null, Cell::Text)
    }
}

impl From<Option<&Number>> for Cell {
    fn from(value: Option<&Number>) -> Self {
        value.map_or(Cell::Null, |n| Cell::Number(n.clone()))
    }
}

impl From<Option<i64>> for Cell {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Cell::Null, |n| Cell::Number(n.into()))
    }
}

impl From<Option<bool>> for Cell {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Cell::Null, Cell::Bool)
    }
}

/// Joins data cells into one pipe-delimited line; null cells become empty strings.
pub fn render_row(cells: &[Cell]) -> String {
    cells
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

/// Joins header labels with the same delimiter as the data rows.
pub fn render_header(labels: &[String]) -> String {
    labels.join(DELIMITER)
}
