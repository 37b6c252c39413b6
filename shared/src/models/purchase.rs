//! Purchase request models

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::table::Numeric;

/// Parameters for a single purchase request calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Supplier to filter on, compared after trimming
    pub supplier_name: String,
    /// Months of average demand the purchase should cover
    pub months_of_cover: u32,
    /// Explicit averaging window; `None` averages every non-reserved column
    pub months_to_average: Option<Vec<String>>,
}

impl CalculationRequest {
    pub fn new(supplier_name: impl Into<String>, months_of_cover: u32) -> Self {
        Self {
            supplier_name: supplier_name.into(),
            months_of_cover,
            months_to_average: None,
        }
    }

    pub fn with_months<S: Into<String>>(mut self, months: impl IntoIterator<Item = S>) -> Self {
        self.months_to_average = Some(months.into_iter().map(Into::into).collect());
        self
    }
}

/// Landed cost in both currencies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandedCost {
    pub lc_in_usd: f64,
    pub lc_in_iqd: f64,
}

/// One product line of the purchase request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub product: String,
    pub product_image: String,
    pub supplier: String,
    /// Coerced values of the averaging window, in window order
    pub month_values: Vec<Numeric>,
    pub avg_monthly_sales: f64,
    pub current_stock: f64,
    pub target_stock: f64,
    pub shortfall: f64,
    pub purchase_qty: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landed_cost: Option<LandedCost>,
}

/// A value in the rendered output grid
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputValue {
    Text(String),
    Formula(String),
    Number(f64),
    Integer(i64),
    Missing,
}

impl From<Numeric> for OutputValue {
    fn from(value: Numeric) -> Self {
        match value {
            Numeric::Present(v) => OutputValue::Number(v),
            Numeric::Missing => OutputValue::Missing,
        }
    }
}

/// Computed purchase request, sorted by purchase quantity descending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    /// Output column order
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
    /// Resolved averaging window
    pub months_used: Vec<String>,
}

impl ResultTable {
    pub fn has_landed_cost(&self) -> bool {
        self.columns.iter().any(|c| c == "lc_in_usd")
    }

    /// Total units across all lines
    pub fn total_purchase_qty(&self) -> i64 {
        self.rows.iter().map(|r| r.purchase_qty).sum()
    }

    /// Row values laid out in `columns` order
    pub fn to_records(&self) -> Vec<Vec<OutputValue>> {
        let with_lc = self.has_landed_cost();
        self.rows
            .iter()
            .map(|row| {
                let mut record = Vec::with_capacity(self.columns.len());
                record.push(OutputValue::Text(row.product.clone()));
                record.push(OutputValue::Formula(row.product_image.clone()));
                record.push(OutputValue::Text(row.supplier.clone()));
                record.extend(row.month_values.iter().copied().map(OutputValue::from));
                record.push(OutputValue::Number(row.avg_monthly_sales));
                record.push(OutputValue::Number(row.current_stock));
                record.push(OutputValue::Number(row.target_stock));
                record.push(OutputValue::Integer(row.purchase_qty));
                if with_lc {
                    let lc = row.landed_cost.unwrap_or(LandedCost {
                        lc_in_usd: 0.0,
                        lc_in_iqd: 0.0,
                    });
                    record.push(OutputValue::Number(lc.lc_in_usd));
                    record.push(OutputValue::Number(lc.lc_in_iqd));
                }
                record
            })
            .collect()
    }
}

/// Result of a calculation: either a table, or no rows for the supplier
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PurchaseOutcome {
    Ready(ResultTable),
    SupplierNotFound { months_considered: Vec<String> },
}

/// Structural failures the calculator refuses to paper over
#[derive(Debug, Error, PartialEq)]
pub enum CalculationError {
    #[error("Required column '{0}' is missing from the inventory table")]
    MissingColumn(&'static str),
}
