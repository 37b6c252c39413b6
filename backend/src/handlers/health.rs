//! Health check and service description handlers

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint handler
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Describe the service and its endpoint parameters
pub async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "Purchase Request API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/generate_purchase_request": {
                "method": "POST",
                "description": "Generate a purchase request spreadsheet for one supplier",
                "parameters": {
                    "file": "Inventory spreadsheet, xlsx/xls/csv (multipart/form-data)",
                    "supplier_name": "Name of supplier (form field)",
                    "months_of_cover": "Number of months to cover (form field, integer)",
                    "months_to_average": "Optional: comma-separated month columns to average (form field)",
                    "format": "Optional: xlsx (default), csv or json"
                },
                "returns": "File download; includes lc_in_usd and lc_in_iqd columns when the input has an LC column"
            }
        }
    }))
}
