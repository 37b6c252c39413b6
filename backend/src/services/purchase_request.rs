//! Purchase request generation service
//!
//! Parses an uploaded inventory file, runs the calculator for one supplier and
//! renders the result in the requested output format.

use shared::{
    output_filename, CalculationRequest, InventoryTable, PurchaseOutcome,
    PurchaseRequestCalculator, ResultTable,
};

use crate::config::LayoutConfig;
use crate::error::{AppError, AppResult};
use crate::services::spreadsheet::{self, SpreadsheetFormat};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// An uploaded inventory file
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Output formats for the generated purchase request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => XLSX_CONTENT_TYPE,
            OutputFormat::Csv => "text/csv",
            OutputFormat::Json => "application/json",
        }
    }
}

/// A rendered purchase request ready for download
#[derive(Debug)]
pub struct GeneratedReport {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub row_count: usize,
    pub total_purchase_qty: i64,
}

/// Purchase request service
#[derive(Clone)]
pub struct PurchaseRequestService {
    calculator: PurchaseRequestCalculator,
    layout: LayoutConfig,
}

impl PurchaseRequestService {
    pub fn new(calculator: PurchaseRequestCalculator, layout: LayoutConfig) -> Self {
        Self { calculator, layout }
    }

    /// Generate a purchase request on the blocking thread pool
    pub async fn generate(
        &self,
        upload: Upload,
        request: CalculationRequest,
        format: OutputFormat,
    ) -> AppResult<GeneratedReport> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.generate_blocking(&upload, &request, format))
            .await
            .map_err(|e| AppError::Internal(format!("Purchase request task failed: {}", e)))?
    }

    /// Parse, compute and render in one pass
    pub fn generate_blocking(
        &self,
        upload: &Upload,
        request: &CalculationRequest,
        format: OutputFormat,
    ) -> AppResult<GeneratedReport> {
        let table = self.parse_upload(upload)?;
        let result = self.calculate(&table, request)?;

        tracing::info!(
            "Purchase request for '{}': {} products, {} units over {} months",
            request.supplier_name.trim(),
            result.rows.len(),
            result.total_purchase_qty(),
            request.months_of_cover
        );

        let body = match format {
            OutputFormat::Xlsx => spreadsheet::render_xlsx(&result, &self.layout)?,
            OutputFormat::Csv => spreadsheet::render_csv(&result)?.into_bytes(),
            OutputFormat::Json => serde_json::to_vec(&result)
                .map_err(|e| AppError::Internal(format!("JSON serialization error: {}", e)))?,
        };

        Ok(GeneratedReport {
            filename: output_filename(
                &request.supplier_name,
                request.months_of_cover,
                format.extension(),
            ),
            content_type: format.content_type(),
            body,
            row_count: result.rows.len(),
            total_purchase_qty: result.total_purchase_qty(),
        })
    }

    pub fn parse_upload(&self, upload: &Upload) -> AppResult<InventoryTable> {
        let format = SpreadsheetFormat::detect(&upload.filename, upload.content_type.as_deref())
            .ok_or_else(|| AppError::UnsupportedFormat(upload.filename.clone()))?;

        tracing::debug!("Reading {} as {:?}", upload.filename, format);
        let table = spreadsheet::parse(&upload.bytes, format)?;
        if table.is_empty() {
            tracing::warn!("{} has a header row but no data rows", upload.filename);
        }
        Ok(table)
    }

    /// Run the calculator, turning an unknown supplier into a 404-style error
    pub fn calculate(
        &self,
        table: &InventoryTable,
        request: &CalculationRequest,
    ) -> AppResult<ResultTable> {
        match self.calculator.compute(table, request)? {
            PurchaseOutcome::Ready(result) => Ok(result),
            PurchaseOutcome::SupplierNotFound { months_considered } => {
                Err(AppError::SupplierNotFound {
                    supplier: request.supplier_name.clone(),
                    months_considered,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVENTORY: &str = "Products,Current Stock,Supplier,Jan,Feb\nX,10,S1,20,30\nY,0,S2,1,1\n";

    fn service() -> PurchaseRequestService {
        PurchaseRequestService::new(PurchaseRequestCalculator::new(), LayoutConfig::default())
    }

    fn csv_upload() -> Upload {
        Upload {
            filename: "inventory.csv".to_string(),
            content_type: Some("text/csv".to_string()),
            bytes: INVENTORY.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_output_format_param() {
        assert_eq!(OutputFormat::from_param("CSV"), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::from_param(" json "), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_param("pdf"), None);
        assert_eq!(OutputFormat::default().extension(), "xlsx");
    }

    #[test]
    fn test_generate_json_report() {
        let report = service()
            .generate_blocking(
                &csv_upload(),
                &CalculationRequest::new(" S1 ", 2),
                OutputFormat::Json,
            )
            .unwrap();

        assert_eq!(report.filename, "purchase_request_S1_2months.json");
        assert_eq!(report.content_type, "application/json");
        assert_eq!(report.row_count, 1);
        assert_eq!(report.total_purchase_qty, 40);

        let body: serde_json::Value = serde_json::from_slice(&report.body).unwrap();
        assert_eq!(body["rows"][0]["purchase_qty"], 40);
        assert_eq!(body["months_used"], serde_json::json!(["jan", "feb"]));
    }

    #[test]
    fn test_unknown_supplier() {
        let err = service()
            .generate_blocking(&csv_upload(), &CalculationRequest::new("S9", 2), OutputFormat::Csv)
            .unwrap_err();

        match err {
            AppError::SupplierNotFound { months_considered, .. } => {
                assert_eq!(months_considered, vec!["jan", "feb"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_upload() {
        let upload = Upload {
            filename: "inventory.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: vec![1, 2, 3],
        };
        let err = service()
            .generate_blocking(&upload, &CalculationRequest::new("S1", 1), OutputFormat::Xlsx)
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_generate_off_thread() {
        let report = service()
            .generate(csv_upload(), CalculationRequest::new("S1", 1), OutputFormat::Xlsx)
            .await
            .unwrap();

        assert_eq!(report.content_type, XLSX_CONTENT_TYPE);
        // xlsx files are zip archives
        assert!(report.body.starts_with(b"PK"));
    }
}
