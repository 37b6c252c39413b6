//! Purchase request calculation tests
//!
//! Tests for the calculator including:
//! - Averaging over the resolved month window
//! - Shortfall and purchase quantity derivation
//! - Landed cost conversion
//! - Supplier matching and the not-found outcome
//! - Output ordering

use proptest::prelude::*;
use shared::{
    CalculationRequest, Cell, InventoryTable, Numeric, PurchaseOutcome, PurchaseRequestCalculator,
    ResultTable, IQD_PER_USD,
};

fn compute(table: &InventoryTable, request: &CalculationRequest) -> PurchaseOutcome {
    PurchaseRequestCalculator::new()
        .compute(table, request)
        .expect("table has all required columns")
}

fn ready(outcome: PurchaseOutcome) -> ResultTable {
    match outcome {
        PurchaseOutcome::Ready(table) => table,
        PurchaseOutcome::SupplierNotFound { months_considered } => {
            panic!("supplier not found, considered {:?}", months_considered)
        }
    }
}

/// Table with columns `Products, Current Stock, Supplier, Jan, Feb`
fn jan_feb_table(rows: &[(&str, Cell, &str, Cell, Cell)]) -> InventoryTable {
    let mut table = InventoryTable::new(["Products", "Current Stock", "Supplier", "Jan", "Feb"]);
    for (product, stock, supplier, jan, feb) in rows {
        table.push_row(vec![
            Cell::text(*product),
            stock.clone(),
            Cell::text(*supplier),
            jan.clone(),
            feb.clone(),
        ]);
    }
    table
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Example: avg 25, target 50, shortfall 40, qty 40
    #[test]
    fn test_basic_shortfall() {
        let table = jan_feb_table(&[("X", 10.0.into(), "S1", 20.0.into(), 30.0.into())]);
        let result = ready(compute(&table, &CalculationRequest::new("S1", 2)));
        let row = &result.rows[0];

        assert_eq!(row.avg_monthly_sales, 25.0);
        assert_eq!(row.target_stock, 50.0);
        assert_eq!(row.shortfall, 40.0);
        assert_eq!(row.purchase_qty, 40);
    }

    /// Example: stock above target orders nothing
    #[test]
    fn test_overstock() {
        let table = jan_feb_table(&[("X", 60.0.into(), "S1", 20.0.into(), 30.0.into())]);
        let result = ready(compute(&table, &CalculationRequest::new("S1", 2)));

        assert_eq!(result.rows[0].shortfall, -10.0);
        assert_eq!(result.rows[0].purchase_qty, 0);
    }

    /// Example: explicit window excludes Feb from the average
    #[test]
    fn test_explicit_window() {
        let table = jan_feb_table(&[("X", 10.0.into(), "S1", 20.0.into(), 30.0.into())]);
        let request = CalculationRequest::new("S1", 2).with_months([" JAN "]);
        let result = ready(compute(&table, &request));

        assert_eq!(result.months_used, vec!["jan"]);
        assert_eq!(result.rows[0].avg_monthly_sales, 20.0);
        assert_eq!(result.rows[0].month_values, vec![Numeric::Present(20.0)]);
        assert!(!result.columns.contains(&"feb".to_string()));
    }

    /// Example: non-numeric cell is skipped, not counted as zero
    #[test]
    fn test_non_numeric_cell_skipped() {
        let table = jan_feb_table(&[("X", 0.0.into(), "S1", 20.0.into(), Cell::text("n/a"))]);
        let result = ready(compute(&table, &CalculationRequest::new("S1", 1)));

        assert_eq!(result.rows[0].avg_monthly_sales, 20.0);
        assert_eq!(result.rows[0].month_values[1], Numeric::Missing);
    }

    /// Example: the only window cell is missing, average fills to zero
    #[test]
    fn test_all_missing_average_is_zero() {
        let table = jan_feb_table(&[("X", 5.0.into(), "S1", Cell::text("n/a"), 30.0.into())]);
        let request = CalculationRequest::new("S1", 3).with_months(["Jan"]);
        let result = ready(compute(&table, &request));

        assert_eq!(result.rows[0].avg_monthly_sales, 0.0);
        assert_eq!(result.rows[0].purchase_qty, 0);
    }

    /// Example: LC 100 converts to 155000 IQD
    #[test]
    fn test_landed_cost_conversion() {
        let mut table = InventoryTable::new(["Products", "Current Stock", "Supplier", "Jan", "LC"]);
        table.push_row(vec![
            Cell::text("X"),
            0.0.into(),
            Cell::text("S1"),
            4.0.into(),
            100.0.into(),
        ]);
        table.push_row(vec![
            Cell::text("Y"),
            0.0.into(),
            Cell::text("S1"),
            2.0.into(),
            Cell::Empty,
        ]);

        let result = ready(compute(&table, &CalculationRequest::new("S1", 1)));
        assert!(result.has_landed_cost());
        assert_eq!(result.months_used, vec!["jan"]);
        assert_eq!(&result.columns[result.columns.len() - 2..], &["lc_in_usd", "lc_in_iqd"]);

        let x = result.rows[0].landed_cost.unwrap();
        assert_eq!(x.lc_in_usd, 100.0);
        assert_eq!(x.lc_in_iqd, 155000.0);

        let y = result.rows[1].landed_cost.unwrap();
        assert_eq!(y.lc_in_usd, 0.0);
        assert_eq!(y.lc_in_iqd, 0.0);
    }

    #[test]
    fn test_no_landed_cost_columns_without_lc() {
        let table = jan_feb_table(&[("X", 0.0.into(), "S1", 1.0.into(), 1.0.into())]);
        let result = ready(compute(&table, &CalculationRequest::new("S1", 1)));

        assert!(!result.has_landed_cost());
        assert!(result.rows[0].landed_cost.is_none());
        assert_eq!(result.to_records()[0].len(), result.columns.len());
    }

    /// Supplier matching trims both sides and is otherwise exact
    #[test]
    fn test_supplier_matching() {
        let table = jan_feb_table(&[
            ("A", 0.0.into(), " Acme ", 1.0.into(), 1.0.into()),
            ("B", 0.0.into(), "Acme2", 1.0.into(), 1.0.into()),
            ("C", 0.0.into(), "acme", 1.0.into(), 1.0.into()),
        ]);
        let result = ready(compute(&table, &CalculationRequest::new("Acme", 1)));

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].product, "A");
    }

    #[test]
    fn test_supplier_not_found_carries_window() {
        let table = jan_feb_table(&[("X", 0.0.into(), "S1", 1.0.into(), 1.0.into())]);
        let outcome = compute(&table, &CalculationRequest::new("Nobody", 1));

        assert_eq!(
            outcome,
            PurchaseOutcome::SupplierNotFound {
                months_considered: vec!["jan".to_string(), "feb".to_string()],
            }
        );
    }

    /// Requested months that do not exist average as missing
    #[test]
    fn test_absent_requested_month() {
        let table = jan_feb_table(&[("X", 0.0.into(), "S1", 10.0.into(), 10.0.into())]);
        let request = CalculationRequest::new("S1", 4).with_months(["Mar"]);
        let result = ready(compute(&table, &request));

        assert_eq!(result.rows[0].month_values, vec![Numeric::Missing]);
        assert_eq!(result.rows[0].avg_monthly_sales, 0.0);
        assert_eq!(result.rows[0].purchase_qty, 0);
        assert!(result.columns.contains(&"mar".to_string()));
    }

    #[test]
    fn test_fractional_shortfall_rounds_up() {
        let table = jan_feb_table(&[("X", 0.0.into(), "S1", 1.0.into(), 2.0.into())]);
        let result = ready(compute(&table, &CalculationRequest::new("S1", 1)));

        assert_eq!(result.rows[0].shortfall, 1.5);
        assert_eq!(result.rows[0].purchase_qty, 2);
    }

    #[test]
    fn test_infinite_demand_clamped() {
        let table = jan_feb_table(&[("X", 0.0.into(), "S1", Cell::text("inf"), 1.0.into())]);
        let result = ready(compute(&table, &CalculationRequest::new("S1", 1)));

        assert_eq!(result.rows[0].shortfall, 0.0);
        assert_eq!(result.rows[0].purchase_qty, 0);
    }

    #[test]
    fn test_missing_stock_treated_as_zero() {
        let table = jan_feb_table(&[("X", Cell::Empty, "S1", 3.0.into(), 3.0.into())]);
        let result = ready(compute(&table, &CalculationRequest::new("S1", 2)));

        assert_eq!(result.rows[0].current_stock, 0.0);
        assert_eq!(result.rows[0].purchase_qty, 6);
    }

    #[test]
    fn test_image_formula_embeds_product() {
        let table = jan_feb_table(&[("SKU-9", 0.0.into(), "S1", 1.0.into(), 1.0.into())]);
        let result = ready(compute(&table, &CalculationRequest::new("S1", 1)));

        assert_eq!(
            result.rows[0].product_image,
            "=IMAGE(\"https://ecomedia.shaghlaty.net/media/catalog/SKU-9.jpg\")"
        );
    }

    /// Equal quantities keep their original row order
    #[test]
    fn test_sort_is_stable() {
        let table = jan_feb_table(&[
            ("A", 0.0.into(), "S1", 1.0.into(), 1.0.into()),
            ("B", 0.0.into(), "S1", 9.0.into(), 9.0.into()),
            ("C", 0.0.into(), "S1", 1.0.into(), 1.0.into()),
        ]);
        let result = ready(compute(&table, &CalculationRequest::new("S1", 1)));
        let order: Vec<&str> = result.rows.iter().map(|r| r.product.as_str()).collect();

        assert_eq!(order, vec!["B", "A", "C"]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn month_cell_strategy() -> impl Strategy<Value = Option<u32>> {
        prop::option::weighted(0.8, 0u32..500)
    }

    fn supplier_strategy() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["S1", " S1 ", "S2", "S10"]).prop_map(String::from)
    }

    /// Rows of (supplier, stock, lc, three months)
    fn table_strategy() -> impl Strategy<Value = InventoryTable> {
        prop::collection::vec(
            (
                supplier_strategy(),
                0u32..2000,
                prop::option::of(0u32..300),
                prop::collection::vec(month_cell_strategy(), 3),
            ),
            1..30,
        )
        .prop_map(|rows| {
            let mut table = InventoryTable::new([
                "Products", "Current Stock", "Supplier", "LC", "M1", "M2", "M3",
            ]);
            for (i, (supplier, stock, lc, months)) in rows.into_iter().enumerate() {
                let mut cells = vec![
                    Cell::text(format!("P{}", i)),
                    Cell::Number(f64::from(stock)),
                    Cell::text(supplier),
                    lc.map_or(Cell::Empty, |v| Cell::Number(f64::from(v))),
                ];
                cells.extend(
                    months
                        .into_iter()
                        .map(|m| m.map_or(Cell::text("n/a"), |v| Cell::Number(f64::from(v)))),
                );
                table.push_row(cells);
            }
            table
        })
    }

    proptest! {
        /// Average equals the arithmetic mean of the numeric window cells
        #[test]
        fn prop_average_is_mean(table in table_strategy(), cover in 0u32..12) {
            let outcome = compute(&table, &CalculationRequest::new("S1", cover));
            if let PurchaseOutcome::Ready(result) = outcome {
                for row in &result.rows {
                    let present: Vec<f64> =
                        row.month_values.iter().filter_map(Numeric::value).collect();
                    let expected = if present.is_empty() {
                        0.0
                    } else {
                        present.iter().sum::<f64>() / present.len() as f64
                    };
                    prop_assert_eq!(row.avg_monthly_sales, expected);
                }
            }
        }

        /// Quantity is never negative and is the ceiling of a positive shortfall
        #[test]
        fn prop_purchase_qty(table in table_strategy(), cover in 0u32..12) {
            let outcome = compute(&table, &CalculationRequest::new("S1", cover));
            if let PurchaseOutcome::Ready(result) = outcome {
                for row in &result.rows {
                    prop_assert!(row.purchase_qty >= 0);
                    prop_assert_eq!(row.target_stock, row.avg_monthly_sales * f64::from(cover));
                    if row.shortfall > 0.0 {
                        prop_assert_eq!(row.purchase_qty, row.shortfall.ceil() as i64);
                    } else {
                        prop_assert_eq!(row.purchase_qty, 0);
                    }
                }
            }
        }

        /// Rows come back in non-increasing quantity order
        #[test]
        fn prop_sorted_descending(table in table_strategy(), cover in 0u32..12) {
            let outcome = compute(&table, &CalculationRequest::new("S1", cover));
            if let PurchaseOutcome::Ready(result) = outcome {
                for pair in result.rows.windows(2) {
                    prop_assert!(pair[0].purchase_qty >= pair[1].purchase_qty);
                }
            }
        }

        /// IQD is always USD times the fixed rate
        #[test]
        fn prop_landed_cost_rate(table in table_strategy()) {
            let outcome = compute(&table, &CalculationRequest::new("S2", 1));
            if let PurchaseOutcome::Ready(result) = outcome {
                for row in &result.rows {
                    let lc = row.landed_cost.expect("LC column present");
                    prop_assert_eq!(lc.lc_in_iqd, lc.lc_in_usd * IQD_PER_USD);
                }
            }
        }

        /// Only rows whose trimmed supplier equals the request are returned
        #[test]
        fn prop_supplier_filter(table in table_strategy()) {
            let expected = table
                .rows()
                .iter()
                .filter(|cells| cells[2].display_text().trim() == "S1")
                .count();

            match compute(&table, &CalculationRequest::new("S1", 1)) {
                PurchaseOutcome::Ready(result) => {
                    prop_assert_eq!(result.rows.len(), expected);
                    prop_assert!(result.rows.iter().all(|r| r.supplier.trim() == "S1"));
                }
                PurchaseOutcome::SupplierNotFound { months_considered } => {
                    prop_assert_eq!(expected, 0);
                    prop_assert_eq!(months_considered, vec!["m1", "m2", "m3"]);
                }
            }
        }

        /// The caller's table is untouched and repeated runs agree
        #[test]
        fn prop_pure_and_deterministic(table in table_strategy(), cover in 0u32..12) {
            let before = table.clone();
            let request = CalculationRequest::new("S1", cover);

            let first = compute(&table, &request);
            let second = compute(&table, &request);

            prop_assert_eq!(&table, &before);
            prop_assert_eq!(first, second);
        }
    }
}
