//! Spreadsheet ingestion and rendering
//!
//! Uploads are read with calamine (xlsx/xls) or the csv crate into an
//! [`InventoryTable`]. Results are written back out as xlsx with
//! umya-spreadsheet, with the product image column emitted as a live formula,
//! or as plain CSV.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use shared::{Cell, InventoryTable, OutputValue, ResultTable};

use crate::config::LayoutConfig;
use crate::error::{AppError, AppResult};

/// Column letter holding the image formula
const IMAGE_COLUMN: &str = "B";

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SpreadsheetFormat {
    /// Detect format from file extension
    pub fn from_extension(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Detect format from content type header
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Some(Self::Xlsx),
            "application/vnd.ms-excel" => Some(Self::Xls),
            "text/csv" | "application/csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn detect(filename: &str, content_type: Option<&str>) -> Option<Self> {
        Self::from_extension(filename).or_else(|| content_type.and_then(Self::from_content_type))
    }
}

/// Parse an uploaded spreadsheet into an inventory table
///
/// The first row of the first sheet holds the column names.
pub fn parse(bytes: &[u8], format: SpreadsheetFormat) -> AppResult<InventoryTable> {
    match format {
        SpreadsheetFormat::Xlsx | SpreadsheetFormat::Xls => parse_workbook(bytes),
        SpreadsheetFormat::Csv => parse_csv(bytes),
    }
}

fn parse_workbook(bytes: &[u8]) -> AppResult<InventoryTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Spreadsheet("workbook has no sheets".to_string()))?
        .map_err(|e| AppError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| header_name(i, &cell.to_string()))
            .collect(),
        None => return Ok(InventoryTable::default()),
    };

    let mut table = InventoryTable::new(headers);
    for row in rows {
        table.push_row(row.iter().map(cell_from_data).collect());
    }

    tracing::debug!(
        "Parsed workbook with {} columns and {} rows",
        table.columns().len(),
        table.len()
    );
    Ok(table)
}

fn parse_csv(bytes: &[u8]) -> AppResult<InventoryTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Spreadsheet(format!("Failed to read CSV headers: {}", e)))?
        .iter()
        .enumerate()
        .map(|(i, h)| header_name(i, h))
        .collect();

    let mut table = InventoryTable::new(headers);
    for (idx, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| AppError::Spreadsheet(format!("Row {}: {}", idx + 2, e)))?;
        table.push_row(
            record
                .iter()
                .map(|v| if v.is_empty() { Cell::Empty } else { Cell::text(v) })
                .collect(),
        );
    }

    tracing::debug!(
        "Parsed CSV with {} columns and {} rows",
        table.columns().len(),
        table.len()
    );
    Ok(table)
}

fn header_name(index: usize, raw: &str) -> String {
    if raw.trim().is_empty() {
        format!("unnamed: {}", index)
    } else {
        raw.to_string()
    }
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

/// Render a result table as an xlsx workbook
///
/// Every row, header included, gets the configured height and the image
/// column is widened so the fetched pictures are visible.
pub fn render_xlsx(result: &ResultTable, layout: &LayoutConfig) -> AppResult<Vec<u8>> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_mut(&0)
        .ok_or_else(|| AppError::Internal("new workbook has no sheet".to_string()))?;
    sheet.set_name("Purchase Request");

    for (col, name) in result.columns.iter().enumerate() {
        sheet
            .get_cell_mut((col as u32 + 1, 1u32))
            .set_value_string(name.clone());
    }

    for (row_idx, record) in result.to_records().into_iter().enumerate() {
        let row = row_idx as u32 + 2;
        for (col, value) in record.into_iter().enumerate() {
            let cell = sheet.get_cell_mut((col as u32 + 1, row));
            match value {
                OutputValue::Text(s) => {
                    cell.set_value_string(s);
                }
                // Stored without the leading '=' as OOXML expects
                OutputValue::Formula(f) => {
                    cell.set_formula(f.trim_start_matches('=').to_string());
                }
                OutputValue::Number(n) if n.is_finite() => {
                    cell.set_value_number(n);
                }
                OutputValue::Number(n) => {
                    cell.set_value_string(n.to_string());
                }
                OutputValue::Integer(i) => {
                    cell.set_value_number(i as f64);
                }
                OutputValue::Missing => {}
            }
        }
    }

    let last_row = result.rows.len() as u32 + 1;
    for row in 1..=last_row {
        sheet.get_row_dimension_mut(&row).set_height(layout.row_height);
    }
    sheet
        .get_column_dimension_mut(IMAGE_COLUMN)
        .set_width(layout.image_column_width);

    let mut buffer = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut buffer)
        .map_err(|e| AppError::Internal(format!("xlsx writer error: {}", e)))?;
    Ok(buffer.into_inner())
}

/// Render a result table as CSV, formulas written as text
pub fn render_csv(result: &ResultTable) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(&result.columns)
        .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;

    for record in result.to_records() {
        let fields: Vec<String> = record.iter().map(csv_field).collect();
        wtr.write_record(&fields)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }

    let csv_data = String::from_utf8(
        wtr.into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
    )
    .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
    Ok(csv_data)
}

fn csv_field(value: &OutputValue) -> String {
    match value {
        OutputValue::Text(s) | OutputValue::Formula(s) => s.clone(),
        OutputValue::Number(n) => n.to_string(),
        OutputValue::Integer(i) => i.to_string(),
        OutputValue::Missing => String::new(),
    }
}
