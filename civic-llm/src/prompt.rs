use crate::model::{truncate_with_ellipsis, ExplanationRequest};

/// JSON shape the model is asked to reply with.
pub const RESPONSE_SHAPE: &str = r#"{
  "summary": "Brief summary here",
  "explanation": "Detailed explanation here",
  "keyPoints": ["Key point 1", "Key point 2", "Key point 3"]
}"#;

/// Build the instruction sent to the text-generation service.
///
/// The caller's text is appended verbatim as the last section.
///
/// ```
/// use civic_llm::model::{ExplanationKind, ExplanationRequest};
/// use civic_llm::prompt::build_explanation_prompt;
///
/// let req = ExplanationRequest::new("Section 80C deductions")
///     .unwrap()
///     .with_kind(ExplanationKind::Document)
///     .with_language("hi");
/// let prompt = build_explanation_prompt(&req);
///
/// assert!(prompt.contains("legal document"));
/// assert!(prompt.contains("in the hi language"));
/// assert!(prompt.ends_with("Section 80C deductions"));
/// ```
pub fn build_explanation_prompt(request: &ExplanationRequest) -> String {
    let prompt = format!(
        "Analyze the following {context} and answer in the {language} language with:\n\
         1. A brief summary (1-2 sentences) capturing the essence of the text\n\
         2. A detailed explanation in simple, everyday language (4-5 sentences)\n\
         3. 3-5 key points that are important to understand\n\
         \n\
         Format the whole response as JSON with exactly this structure:\n\
         {shape}\n\
         \n\
         Here is the text to explain:\n\
         {text}",
        context = request.kind().context_phrase(),
        language = request.language(),
        shape = RESPONSE_SHAPE,
        text = request.text(),
    );

    tracing::debug!(
        kind = request.kind().as_str(),
        prompt_prefix = %truncate_with_ellipsis(&prompt, 100),
        "explain.prompt.built"
    );
    prompt
}
