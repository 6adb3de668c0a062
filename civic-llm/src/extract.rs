//! Structured extraction of the explanation payload from free-form model output.
//!
//! Models wrap JSON in prose or code fences, so locating the object is
//! lenient: everything from the first `{` to the last `}` is taken. What is
//! found there is checked strictly. Each step fails with its own
//! [`ExtractError`] variant.

use serde_json::{Map, Value};

/// The three fields every explanation must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedExplanation {
    pub summary: String,
    pub explanation: String,
    pub key_points: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("no JSON found in model response")]
    NoJsonFound,

    /// `fragment` is the offending substring, kept for diagnostics only.
    #[error("malformed JSON in model response: {source}")]
    MalformedJson {
        #[source]
        source: serde_json::Error,
        fragment: String,
    },

    #[error("invalid response structure: {0}")]
    InvalidStructure(String),
}

/// Greedy brace match: first `{` through last `}`.
pub fn find_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Locate, parse and validate the explanation payload in `raw`.
///
/// ```
/// use civic_llm::extract::extract_explanation;
///
/// let raw = r#"Sure! {"summary":"S","explanation":"E","keyPoints":["a","b","c"]} Hope that helps."#;
/// let payload = extract_explanation(raw).unwrap();
/// assert_eq!(payload.key_points.len(), 3);
/// ```
pub fn extract_explanation(raw: &str) -> Result<ExtractedExplanation, ExtractError> {
    let fragment = find_json_object(raw).ok_or(ExtractError::NoJsonFound)?;
    let value = parse_payload(fragment)?;
    validate_payload(&value)
}

pub fn parse_payload(fragment: &str) -> Result<Value, ExtractError> {
    serde_json::from_str(fragment).map_err(|source| ExtractError::MalformedJson {
        source,
        fragment: fragment.to_string(),
    })
}

pub fn validate_payload(value: &Value) -> Result<ExtractedExplanation, ExtractError> {
    let object = value
        .as_object()
        .ok_or_else(|| ExtractError::InvalidStructure("expected a JSON object".into()))?;

    Ok(ExtractedExplanation {
        summary: required_text(object, "summary")?,
        explanation: required_text(object, "explanation")?,
        key_points: required_list(object, "keyPoints")?,
    })
}

fn required_text(object: &Map<String, Value>, field: &str) -> Result<String, ExtractError> {
    match object.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(ExtractError::InvalidStructure(format!(
            "`{field}` is empty"
        ))),
        Some(_) => Err(ExtractError::InvalidStructure(format!(
            "`{field}` must be a string"
        ))),
        None => Err(ExtractError::InvalidStructure(format!(
            "`{field}` is missing"
        ))),
    }
}

fn required_list(object: &Map<String, Value>, field: &str) -> Result<Vec<String>, ExtractError> {
    let items = match object.get(field) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ExtractError::InvalidStructure(format!(
                "`{field}` must be an array"
            )))
        }
        None => {
            return Err(ExtractError::InvalidStructure(format!(
                "`{field}` is missing"
            )))
        }
    };

    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                ExtractError::InvalidStructure(format!("`{field}` must only contain strings"))
            })
        })
        .collect()
}
