//! Tabular values: master dataset rows and report tables.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single dataset value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Missing value.
    #[default]
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Int(_) | Cell::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(n) => Some(*n as f64),
            Cell::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Folio value held by this cell.
    ///
    /// Non-negative integers, integral floats and all-digit text qualify.
    pub fn as_code(&self) -> Option<u64> {
        match self {
            Cell::Int(n) => u64::try_from(*n).ok(),
            Cell::Float(n) if n.fract() == 0.0 && *n >= 0.0 && *n < u64::MAX as f64 => {
                Some(*n as u64)
            }
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                s.parse().ok()
            }
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Int(n) => write!(f, "{}", n),
            Cell::Float(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Int(n)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Float(n)
    }
}

/// Rows of the master dataset under their column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MasterTable {
    /// Column names in sheet order.
    pub columns: Vec<String>,
    /// Data rows, each aligned with `columns`.
    pub rows: Vec<Vec<Cell>>,
}

impl MasterTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Report rows projected onto the caller's column choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTable {
    /// Chosen column names, in output order.
    pub columns: Vec<String>,
    /// Rows aligned with `columns`; unknown columns hold [`Cell::Empty`].
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Rows as JSON objects keyed by column name.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(name, cell)| {
                        let value = serde_json::to_value(cell).unwrap_or(Value::Null);
                        (name.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }
}
