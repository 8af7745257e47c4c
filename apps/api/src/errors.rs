use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::extract::ExtractionError;
use crate::llm_client::LlmError;

/// Application-level error type.
///
/// `Display` is the message shown to the user. The HTML surface flashes it on
/// the entry page; `IntoResponse` renders it as a JSON error body for the API.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No file part")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Invalid file type. Please upload a PDF.")]
    InvalidFileType,

    #[error("File is too large. The maximum upload size is 16 MB.")]
    PayloadTooLarge,

    #[error("Error uploading file: {0}")]
    Upload(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Error generating ATS score: {0}")]
    ModelCall(String),

    #[error("Error: Empty response from ATS analysis.")]
    EmptyResponse,

    #[error("Error: Invalid response from ATS analysis.")]
    InvalidJson,

    #[error("Error: Invalid response format from ATS analysis.")]
    InvalidFormat,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Coarse failure classes. Every class ends the same way for a browser user
/// (flash + redirect); only the API surface exposes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    UploadRejected,
    ExtractionFailed,
    ModelCallFailed,
    ModelResponseInvalid,
    Internal,
}

impl AppError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AppError::MissingFile
            | AppError::EmptyFilename
            | AppError::InvalidFileType
            | AppError::PayloadTooLarge
            | AppError::Upload(_) => ErrorClass::UploadRejected,
            AppError::Extraction(_) => ErrorClass::ExtractionFailed,
            AppError::ModelCall(_) => ErrorClass::ModelCallFailed,
            AppError::EmptyResponse | AppError::InvalidJson | AppError::InvalidFormat => {
                ErrorClass::ModelResponseInvalid
            }
            AppError::Internal(_) => ErrorClass::Internal,
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::EmptyContent => AppError::EmptyResponse,
            other => AppError::ModelCall(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::MissingFile | AppError::EmptyFilename => {
                (StatusCode::BAD_REQUEST, "MISSING_FILE")
            }
            AppError::InvalidFileType => (StatusCode::BAD_REQUEST, "INVALID_FILE_TYPE"),
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            AppError::Upload(msg) => {
                tracing::error!("Upload error: {msg}");
                (StatusCode::BAD_REQUEST, "UPLOAD_ERROR")
            }
            AppError::Extraction(_) => (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_FAILED"),
            AppError::ModelCall(msg) => {
                tracing::error!("LLM error: {msg}");
                (StatusCode::BAD_GATEWAY, "LLM_ERROR")
            }
            AppError::EmptyResponse | AppError::InvalidJson | AppError::InvalidFormat => {
                (StatusCode::BAD_GATEWAY, "LLM_RESPONSE_INVALID")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let message = match &self {
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
