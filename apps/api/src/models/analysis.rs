use serde::{Deserialize, Serialize};

/// Score and feedback returned by a successful analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub ats_score: i64,
    pub feedback: String,
}
