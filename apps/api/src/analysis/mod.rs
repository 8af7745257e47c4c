// Résumé analysis pipeline.
// Received -> Validated -> Saved -> Extracted -> PromptBuilt -> ModelInvoked -> Parsed,
// then the handler renders. Any stage may fail; the saved upload is removed
// before `analyze_upload` returns on every path.

pub mod extract;
pub mod handlers;
pub mod prompts;
pub mod response;
pub mod upload;

use std::fmt;
use std::path::PathBuf;

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::analysis::extract::extract_text_from_path;
use crate::analysis::prompts::build_ats_prompt;
use crate::analysis::response::parse_model_response;
use crate::analysis::upload::{allowed_file, save_upload, Upload};
use crate::errors::AppError;
use crate::models::analysis::AnalysisResult;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    Saved,
    Extracted,
    PromptBuilt,
    ModelInvoked,
    Parsed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::Saved => "saved",
            Stage::Extracted => "extracted",
            Stage::PromptBuilt => "prompt_built",
            Stage::ModelInvoked => "model_invoked",
            Stage::Parsed => "parsed",
        };
        f.write_str(name)
    }
}

fn failed(after: Stage, err: AppError) -> AppError {
    warn!(stage = %after, class = ?err.class(), "Analysis failed: {err}");
    err
}

/// Runs one upload through the whole pipeline.
pub async fn analyze_upload(state: &AppState, upload: Upload) -> Result<AnalysisResult, AppError> {
    debug!(stage = %Stage::Received, "Analyzing upload {:?}", upload.filename);

    if upload.filename.is_empty() {
        return Err(failed(Stage::Received, AppError::EmptyFilename));
    }
    if !allowed_file(&upload.filename) {
        warn!("Invalid file type uploaded: {}", upload.filename);
        return Err(failed(Stage::Received, AppError::InvalidFileType));
    }
    debug!(stage = %Stage::Validated, "Accepted {}", upload.filename);

    let saved = save_upload(&state.config.upload_dir, &upload)
        .await
        .map_err(|e| failed(Stage::Validated, e))?;
    debug!(stage = %Stage::Saved, "Saved to {}", saved.path().display());

    let result = analyze_saved(state, saved.path().to_path_buf()).await;
    saved.cleanup().await;

    if let Ok(analysis) = &result {
        info!(
            "ATS Score: {}, Feedback: {}",
            analysis.ats_score, analysis.feedback
        );
    }
    result
}

async fn analyze_saved(state: &AppState, path: PathBuf) -> Result<AnalysisResult, AppError> {
    let resume_text = tokio::task::spawn_blocking(move || extract_text_from_path(&path))
        .await
        .map_err(|e| failed(Stage::Saved, AppError::Internal(anyhow!(e))))?
        .map_err(|e| failed(Stage::Saved, e.into()))?;
    debug!(
        stage = %Stage::Extracted,
        "Extracted resume text length: {} characters",
        resume_text.len()
    );

    let prompt = build_ats_prompt(&resume_text);
    debug!(stage = %Stage::PromptBuilt, "Prompt length: {} characters", prompt.len());

    let raw = state
        .llm
        .generate(&prompt)
        .await
        .map_err(|e| failed(Stage::PromptBuilt, e.into()))?;
    debug!(stage = %Stage::ModelInvoked, "Model response: {raw}");

    let analysis = parse_model_response(&raw).map_err(|e| failed(Stage::ModelInvoked, e))?;
    debug!(stage = %Stage::Parsed, "Parsed ATS score: {}", analysis.ats_score);

    Ok(analysis)
}
