//! PDF processing endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::processor::{ProcessRequest, ProcessResponse};
use crate::state::AppState;

/// Selectively OCR one stored PDF
///
/// POST /pdf/process
pub async fn process_pdf(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let response = state.processor().handle(request).await?;
    tracing::info!(
        "Processed request: ocr_needed={} output_file={}",
        response.ocr_needed,
        response.output_file
    );
    Ok(Json(response))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/process", post(process_pdf))
}
