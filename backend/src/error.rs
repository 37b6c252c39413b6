//! Error handling for the Purchase Request Service
//!
//! Every failure is reported as a JSON body of the form
//! `{"error": {"code": ..., "message": ...}}`.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::CalculationError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("No file provided")]
    NoFile,

    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Malformed multipart request: {0}")]
    Multipart(#[from] MultipartError),

    // Upload errors
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Unreadable spreadsheet: {0}")]
    Spreadsheet(String),

    // Domain outcomes
    #[error("Supplier not found: {supplier}")]
    SupplierNotFound {
        supplier: String,
        months_considered: Vec<String>,
    },

    #[error("Calculation failed: {0}")]
    Calculation(#[from] CalculationError),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months_considered: Option<Vec<String>>,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            months_considered: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::NoFile => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("NO_FILE", "No file provided"),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone())
                },
            ),
            AppError::Multipart(err) => (
                err.status(),
                ErrorDetail::new("INVALID_MULTIPART", err.body_text()),
            ),
            AppError::UnsupportedFormat(name) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorDetail::new(
                    "UNSUPPORTED_FORMAT",
                    format!("Unsupported file format: {}", name),
                ),
            ),
            AppError::Spreadsheet(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(
                    "INVALID_SPREADSHEET",
                    format!("Could not read spreadsheet: {}", msg),
                ),
            ),
            AppError::SupplierNotFound {
                months_considered, ..
            } => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    months_considered: Some(months_considered.clone()),
                    ..ErrorDetail::new(
                        "SUPPLIER_NOT_FOUND",
                        "Supplier not found in the inventory file",
                    )
                },
            ),
            AppError::Calculation(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("CALCULATION_FAILED", err.to_string()),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
        };

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
