//! Purchase request upload handler

use axum::{
    extract::{Multipart, Query, State},
    http::{header, HeaderName},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use shared::{
    parse_months_of_cover, parse_months_to_average, validate_supplier_name, CalculationRequest,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    services::purchase_request::{OutputFormat, Upload},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct GenerateQuery {
    /// "xlsx", "csv" or "json"
    pub format: Option<String>,
}

/// Raw multipart fields before validation
#[derive(Debug, Default)]
struct PurchaseRequestForm {
    file: Option<Upload>,
    supplier_name: Option<String>,
    months_of_cover: Option<String>,
    months_to_average: Option<String>,
    format: Option<String>,
}

impl PurchaseRequestForm {
    async fn read(multipart: &mut Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    form.file = Some(Upload {
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                "supplier_name" => form.supplier_name = Some(field.text().await?),
                "months_of_cover" => form.months_of_cover = Some(field.text().await?),
                "months_to_average" => form.months_to_average = Some(field.text().await?),
                "format" => form.format = Some(field.text().await?),
                _ => tracing::debug!("Ignoring unknown form field '{}'", name),
            }
        }

        Ok(form)
    }

    fn into_parts(
        self,
        query_format: Option<String>,
    ) -> AppResult<(Upload, CalculationRequest, OutputFormat)> {
        let upload = self.file.ok_or(AppError::NoFile)?;
        if upload.filename.is_empty() {
            return Err(AppError::validation("file", "No file selected"));
        }

        let supplier_name = self.supplier_name.unwrap_or_default();
        validate_supplier_name(&supplier_name)
            .map_err(|msg| AppError::validation("supplier_name", msg))?;

        let months_of_cover = parse_months_of_cover(self.months_of_cover.as_deref().unwrap_or(""))
            .map_err(|msg| AppError::validation("months_of_cover", msg))?;

        let format = match self.format.or(query_format) {
            Some(value) => OutputFormat::from_param(&value).ok_or_else(|| {
                AppError::validation("format", "format must be one of xlsx, csv or json")
            })?,
            None => OutputFormat::default(),
        };

        let request = CalculationRequest {
            supplier_name,
            months_of_cover,
            months_to_average: parse_months_to_average(self.months_to_average.as_deref()),
        };

        Ok((upload, request, format))
    }
}

/// Generate a purchase request file from an uploaded inventory spreadsheet
pub async fn generate_purchase_request(
    State(state): State<AppState>,
    Query(query): Query<GenerateQuery>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("purchase_request", %request_id);

    async move {
        let form = PurchaseRequestForm::read(&mut multipart).await?;
        let (upload, request, format) = form.into_parts(query.format)?;

        tracing::info!(
            "Generating purchase request for '{}' from {} ({} bytes)",
            request.supplier_name,
            upload.filename,
            upload.bytes.len()
        );

        let report = state
            .purchase_requests
            .generate(upload, request, format)
            .await?;

        let disposition = format!("attachment; filename=\"{}\"", report.filename);
        Ok::<_, AppError>((
            [
                (header::CONTENT_TYPE, report.content_type.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
                (HeaderName::from_static("x-request-id"), request_id.to_string()),
            ],
            report.body,
        )
            .into_response())
    }
    .instrument(span)
    .await
}
