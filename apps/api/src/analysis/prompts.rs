// ATS scoring prompt template.
// The résumé text is substituted verbatim; nothing in it is escaped.

pub const ATS_SCORE_PROMPT: &str = r#"Analyze this resume for ATS (Applicant Tracking System) compatibility.
Provide an ATS score out of 100 based on:
- Keyword optimization
- Formatting and structure
- Readability
- Use of standard sections (e.g., Experience, Skills, Education)
- Avoidance of tables/graphics that ATS might not parse well

Resume content:
{resume_text}

Return a JSON object in this exact format:
{
    "ats_score": <integer>,
    "feedback": "<string>"
}
Ensure the response is valid JSON and contains only the specified fields.
Do not wrap the JSON in Markdown code blocks or include extra text."#;

pub fn build_ats_prompt(resume_text: &str) -> String {
    ATS_SCORE_PROMPT.replace("{resume_text}", resume_text)
}
