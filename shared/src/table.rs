//! Schema-flexible inventory table
//!
//! Uploaded spreadsheets carry arbitrary columns with mixed cell types, so rows
//! are kept as loosely typed cells addressed by column name. Numeric coercion
//! happens at the boundary into [`Numeric`], which keeps "missing" distinct
//! from zero until a caller decides to fill it.

use serde::{Deserialize, Serialize};

/// A single raw spreadsheet cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Coerce the cell to a number; anything unparsable becomes `Missing`
    pub fn to_numeric(&self) -> Numeric {
        match self {
            Cell::Empty => Numeric::Missing,
            Cell::Number(n) => Numeric::from_f64(*n),
            Cell::Bool(b) => Numeric::Present(if *b { 1.0 } else { 0.0 }),
            Cell::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Numeric::from_f64)
                .unwrap_or(Numeric::Missing),
        }
    }

    /// Render the cell as plain text
    ///
    /// Whole numbers print without a fractional part so that a product code
    /// stored as `1042.0` reads back as `1042`.
    pub fn display_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// A coerced numeric value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Numeric {
    Present(f64),
    #[default]
    Missing,
}

impl Numeric {
    /// NaN carries no information and is folded into `Missing`
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            Numeric::Missing
        } else {
            Numeric::Present(value)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Numeric::Present(v) => Some(*v),
            Numeric::Missing => None,
        }
    }

    pub fn unwrap_or_zero(&self) -> f64 {
        self.value().unwrap_or(0.0)
    }

    /// Mean of the present values, `Missing` when there are none
    pub fn mean(values: &[Numeric]) -> Numeric {
        let (sum, count) = values
            .iter()
            .filter_map(Numeric::value)
            .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));

        if count == 0 {
            Numeric::Missing
        } else {
            Numeric::from_f64(sum / count as f64)
        }
    }
}

/// Ordered rows of loosely typed cells, addressed by column name
///
/// Rows are only added through [`InventoryTable::push_row`], so every row is
/// exactly as wide as the header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InventoryTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl InventoryTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with `Empty` and truncating long ones
    pub fn push_row(&mut self, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Empty);
        self.rows.push(cells);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column with exactly this name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Copy of the table with every column name trimmed and lowercased
    pub fn normalized(&self) -> InventoryTable {
        InventoryTable {
            columns: self.columns.iter().map(|c| normalize_name(c)).collect(),
            rows: self.rows.clone(),
        }
    }
}

/// Canonical form of a column name
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
