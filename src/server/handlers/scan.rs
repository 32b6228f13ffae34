//! Scan parsing and barcode preview handlers.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::barcode::render_barcode;
use crate::error::ReelprintError;
use crate::scan::{ScanCode, parse_qr_code_data, with_year_suffix};

use super::{ApiError, blocking};

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    /// Raw scanner output
    pub input: String,
    /// Two-digit year appended when the code carries none
    pub year: Option<String>,
}

/// Handle POST /api/scan/parse - normalise a scanned code.
pub async fn parse(
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<ScanCode>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError(ReelprintError::InvalidInput(e.body_text())))?;
    let mut scan = parse_qr_code_data(&request.input);
    if scan.is_valid
        && let Some(year) = &request.year
    {
        scan.code = with_year_suffix(&scan.code, year);
    }
    Ok(Json(scan))
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub value: String,
}

/// Handle POST /api/barcode/preview - render a barcode as PNG.
pub async fn barcode_preview(
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError(ReelprintError::InvalidInput(e.body_text())))?;
    let value = request.value.trim().to_string();
    if value.is_empty() {
        return Err(ApiError(ReelprintError::InvalidInput("value cannot be empty".into())));
    }
    let png = blocking(move || {
        render_barcode(&value)
            .to_png()
            .map_err(|e| ReelprintError::Generation(format!("PNG encode failed: {}", e)))
    })
    .await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
