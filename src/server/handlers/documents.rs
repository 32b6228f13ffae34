//! Label and packing-slip handlers.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::document::{Document, OutputMode, render_label, render_packing_slip};
use crate::error::ReelprintError;
use crate::model::{ScanResult, Shipment};

use super::super::state::AppState;
use super::{ApiError, blocking};

#[derive(Debug, Default, Deserialize)]
pub struct ModeQuery {
    #[serde(default)]
    pub mode: OutputMode,
}

fn pdf_response(document: Document, mode: OutputMode) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, document.content_disposition(mode)),
        ],
        document.bytes,
    )
        .into_response()
}

fn bad_body(e: JsonRejection) -> ApiError {
    ApiError(ReelprintError::InvalidInput(e.body_text()))
}

/// Handle POST /api/label - render a roll label.
pub async fn label(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModeQuery>,
    payload: Result<Json<ScanResult>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(roll) = payload.map_err(bad_body)?;
    let assets = state.assets().await;
    let today = state.today();
    let worker = state.clone();
    let document = blocking(move || render_label(&roll, &assets, &worker.config, today)).await?;
    Ok(pdf_response(document, query.mode))
}

/// Handle POST /api/packing-slip - render a packing slip.
pub async fn packing_slip(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModeQuery>,
    payload: Result<Json<Shipment>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(shipment) = payload.map_err(bad_body)?;
    let assets = state.assets().await;
    let today = state.today();
    let worker = state.clone();
    let document =
        blocking(move || render_packing_slip(&shipment, &assets, &worker.config, today)).await?;
    Ok(pdf_response(document, query.mode))
}
