//! Purchase request calculation
//!
//! Turns an inventory table into per-product purchase quantities for one
//! supplier: normalize column names, resolve the averaging window, coerce
//! numerics, average demand, filter to the supplier, then project target
//! stock and purchase quantity.

use crate::models::{
    CalculationError, CalculationRequest, LandedCost, PurchaseOutcome, ResultRow, ResultTable,
};
use crate::table::{normalize_name, Cell, InventoryTable, Numeric};

pub const PRODUCTS_COLUMN: &str = "products";
pub const CURRENT_STOCK_COLUMN: &str = "current stock";
pub const SUPPLIER_COLUMN: &str = "supplier";
pub const LANDED_COST_COLUMN: &str = "lc";

/// Columns that are never treated as months
pub const RESERVED_COLUMNS: [&str; 4] = [
    PRODUCTS_COLUMN,
    CURRENT_STOCK_COLUMN,
    SUPPLIER_COLUMN,
    LANDED_COST_COLUMN,
];

/// Iraqi dinars per US dollar
pub const IQD_PER_USD: f64 = 1550.0;

pub const DEFAULT_IMAGE_URL_BASE: &str = "https://ecomedia.shaghlaty.net/media/catalog/";
pub const IMAGE_EXTENSION: &str = ".jpg";

/// Computes purchase requests from inventory tables
#[derive(Debug, Clone)]
pub struct PurchaseRequestCalculator {
    iqd_per_usd: f64,
    image_url_base: String,
}

impl Default for PurchaseRequestCalculator {
    fn default() -> Self {
        Self {
            iqd_per_usd: IQD_PER_USD,
            image_url_base: DEFAULT_IMAGE_URL_BASE.to_string(),
        }
    }
}

impl PurchaseRequestCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_url_base(mut self, base: impl Into<String>) -> Self {
        self.image_url_base = base.into();
        self
    }

    /// `=IMAGE(...)` formula pointing at the product's catalog picture
    pub fn image_formula(&self, product: &str) -> String {
        format!(
            "=IMAGE(\"{}{}{}\")",
            self.image_url_base, product, IMAGE_EXTENSION
        )
    }

    /// Compute the purchase request for one supplier
    ///
    /// The caller's table is only read. Unparsable cells degrade to missing
    /// values. A table without `supplier` or `current stock` columns is
    /// rejected, as is one without `products` once a supplier row matches.
    pub fn compute(
        &self,
        table: &InventoryTable,
        request: &CalculationRequest,
    ) -> Result<PurchaseOutcome, CalculationError> {
        let table = table.normalized();
        let months = resolve_window(&table, request.months_to_average.as_deref());

        let supplier_idx = required_column(&table, SUPPLIER_COLUMN)?;
        let stock_idx = required_column(&table, CURRENT_STOCK_COLUMN)?;
        let lc_idx = table.column_index(LANDED_COST_COLUMN);
        let month_idx: Vec<Option<usize>> =
            months.iter().map(|m| table.column_index(m)).collect();

        let supplier_name = request.supplier_name.trim();
        let matching: Vec<&Vec<Cell>> = table
            .rows()
            .iter()
            .filter(|cells| cell_at(cells, supplier_idx).display_text().trim() == supplier_name)
            .collect();

        if matching.is_empty() {
            return Ok(PurchaseOutcome::SupplierNotFound {
                months_considered: months,
            });
        }

        // Identifiers are only needed once something matched
        let product_idx = required_column(&table, PRODUCTS_COLUMN)?;
        let cover = f64::from(request.months_of_cover);

        let mut rows: Vec<ResultRow> = matching
            .into_iter()
            .map(|cells| {
                let month_values: Vec<Numeric> = month_idx
                    .iter()
                    .map(|idx| idx.map_or(Numeric::Missing, |i| cell_at(cells, i).to_numeric()))
                    .collect();

                let avg_monthly_sales = Numeric::mean(&month_values).unwrap_or_zero();
                let current_stock = cell_at(cells, stock_idx).to_numeric().unwrap_or_zero();
                let target_stock = avg_monthly_sales * cover;
                let shortfall = finite_or_zero(target_stock - current_stock);

                let landed_cost = lc_idx.map(|i| {
                    let usd = cell_at(cells, i).to_numeric().unwrap_or_zero();
                    LandedCost {
                        lc_in_usd: usd,
                        lc_in_iqd: usd * self.iqd_per_usd,
                    }
                });

                let product = cell_at(cells, product_idx).display_text();
                ResultRow {
                    product_image: self.image_formula(&product),
                    product,
                    supplier: cell_at(cells, supplier_idx).display_text(),
                    month_values,
                    avg_monthly_sales,
                    current_stock,
                    target_stock,
                    shortfall,
                    purchase_qty: purchase_quantity(shortfall),
                    landed_cost,
                }
            })
            .collect();

        // Stable: equal quantities keep their sheet order
        rows.sort_by(|a, b| b.purchase_qty.cmp(&a.purchase_qty));

        Ok(PurchaseOutcome::Ready(ResultTable {
            columns: output_columns(&months, lc_idx.is_some()),
            rows,
            months_used: months,
        }))
    }
}

/// Requested months normalized, or every non-reserved column in sheet order
pub fn resolve_window(table: &InventoryTable, requested: Option<&[String]>) -> Vec<String> {
    match requested {
        Some(months) => months.iter().map(|m| normalize_name(m)).collect(),
        None => table
            .columns()
            .iter()
            .filter(|c| !RESERVED_COLUMNS.contains(&c.as_str()))
            .cloned()
            .collect(),
    }
}

/// Whole units to order for a shortfall
pub fn purchase_quantity(shortfall: f64) -> i64 {
    if shortfall > 0.0 {
        // `as` saturates for values beyond i64
        shortfall.ceil() as i64
    } else {
        0
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Cells past the end of a row read as empty
fn cell_at(cells: &[Cell], idx: usize) -> &Cell {
    const EMPTY: &Cell = &Cell::Empty;
    cells.get(idx).unwrap_or(EMPTY)
}

fn required_column(table: &InventoryTable, name: &'static str) -> Result<usize, CalculationError> {
    table
        .column_index(name)
        .ok_or(CalculationError::MissingColumn(name))
}

fn output_columns(months: &[String], with_lc: bool) -> Vec<String> {
    let mut columns = vec![
        PRODUCTS_COLUMN.to_string(),
        "product_image".to_string(),
        SUPPLIER_COLUMN.to_string(),
    ];
    columns.extend(months.iter().cloned());
    columns.extend(
        ["avg_monthly_sales", CURRENT_STOCK_COLUMN, "target_stock", "purchase_qty"]
            .iter()
            .map(|c| c.to_string()),
    );
    if with_lc {
        columns.push("lc_in_usd".to_string());
        columns.push("lc_in_iqd".to_string());
    }
    columns
}
