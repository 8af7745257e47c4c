//! HTML pages. Templates are compiled in; every substituted value is
//! HTML-escaped first.

use html_escape::encode_text;

use crate::models::analysis::AnalysisResult;

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");
const RESULT_TEMPLATE: &str = include_str!("../../templates/result.html");

/// Entry page, optionally showing a one-shot error message.
pub fn render_index(flash: Option<&str>) -> String {
    let flash_html = flash
        .filter(|msg| !msg.trim().is_empty())
        .map(|msg| format!(r#"<div class="flash">{}</div>"#, encode_text(msg)))
        .unwrap_or_default();
    INDEX_TEMPLATE.replace("{{flash}}", &flash_html)
}

pub fn render_result(result: &AnalysisResult) -> String {
    RESULT_TEMPLATE
        .replace("{{score}}", &result.ats_score.to_string())
        .replace("{{feedback}}", &encode_text(&result.feedback))
}

/// Location of the entry page carrying `message` as its flash.
pub fn flash_location(message: &str) -> String {
    format!("/?error={}", urlencoding::encode(message))
}
