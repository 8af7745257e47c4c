//! Validation of the model's JSON answer.
//!
//! The model is only asked, not guaranteed, to return
//! `{"ats_score": <integer>, "feedback": "<string>"}`. Absent fields get
//! defaults; present fields of the wrong shape reject the whole response.

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::errors::AppError;
use crate::llm_client::clean_json_response;
use crate::models::analysis::AnalysisResult;

pub const DEFAULT_SCORE: i64 = 0;
pub const DEFAULT_FEEDBACK: &str = "No feedback available.";
pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

/// Normalizes and validates raw model output.
pub fn parse_model_response(raw: &str) -> Result<AnalysisResult, AppError> {
    if raw.trim().is_empty() {
        error!("Empty response from model");
        return Err(AppError::EmptyResponse);
    }

    let cleaned = clean_json_response(raw);
    debug!("Cleaned response: {}", preview(&cleaned));

    let value: Value = serde_json::from_str(&cleaned).map_err(|e| {
        error!("JSON decode error: {e}, response: {}", preview(raw));
        AppError::InvalidJson
    })?;

    let Value::Object(fields) = value else {
        error!("Model response is not a JSON object: {}", preview(&cleaned));
        return Err(AppError::InvalidFormat);
    };

    validate_fields(&fields)
}

fn validate_fields(fields: &Map<String, Value>) -> Result<AnalysisResult, AppError> {
    let ats_score = match fields.get("ats_score") {
        None => DEFAULT_SCORE,
        Some(v) => v.as_i64().ok_or_else(|| {
            error!("Invalid ats_score in model response: {v}");
            AppError::InvalidFormat
        })?,
    };

    let feedback = match fields.get("feedback") {
        None => DEFAULT_FEEDBACK.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            error!("Invalid feedback in model response: {other}");
            return Err(AppError::InvalidFormat);
        }
    };

    if !(MIN_SCORE..=MAX_SCORE).contains(&ats_score) {
        error!("ats_score {ats_score} outside {MIN_SCORE}..={MAX_SCORE}");
        return Err(AppError::InvalidFormat);
    }

    let extra: Vec<&str> = fields
        .keys()
        .map(String::as_str)
        .filter(|k| *k != "ats_score" && *k != "feedback")
        .collect();
    if !extra.is_empty() {
        debug!("Ignoring extra fields in model response: {extra:?}");
    }

    Ok(AnalysisResult {
        ats_score,
        feedback,
    })
}

fn preview(s: &str) -> String {
    s.chars().take(100).collect()
}
