//! Axum route handlers for résumé analysis.
//!
//! The browser surface never shows an error page: every failure becomes a
//! redirect back to `/` carrying the message. The JSON surface returns the
//! same messages through `AppError`'s error body.

use axum::{
    extract::{multipart::MultipartError, multipart::MultipartRejection, Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::analysis::analyze_upload;
use crate::analysis::upload::Upload;
use crate::errors::AppError;
use crate::models::analysis::AnalysisResult;
use crate::state::AppState;
use crate::views::{flash_location, render_index, render_result};

/// Multipart field carrying the résumé.
pub const RESUME_FIELD: &str = "resume";

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub error: Option<String>,
}

/// GET /
pub async fn handle_index(Query(query): Query<IndexQuery>) -> Html<String> {
    Html(render_index(query.error.as_deref()))
}

/// POST /upload
///
/// Renders the result page on success; otherwise redirects to `/` with the
/// failure message.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    info!("Received upload request");
    match receive_and_analyze(&state, multipart).await {
        Ok(result) => Html(render_result(&result)).into_response(),
        Err(err) => {
            warn!("Upload failed: {err}");
            Redirect::to(&flash_location(&err.to_string())).into_response()
        }
    }
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let result = receive_and_analyze(&state, multipart).await?;
    Ok(Json(result))
}

async fn receive_and_analyze(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<AnalysisResult, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!("No file part in request: {rejection}");
        AppError::MissingFile
    })?;
    let upload = read_resume_field(&mut multipart).await?;
    analyze_upload(state, upload).await
}

async fn read_resume_field(multipart: &mut Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Upload { filename, bytes });
    }
    warn!("No file part in request");
    Err(AppError::MissingFile)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Upload(err.body_text())
    }
}
