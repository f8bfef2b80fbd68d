//! Best-effort extraction of a JSON object from free-form model output.
//!
//! Models asked for strict JSON often wrap it in prose. Extraction locates
//! the first `{` and the last `}` and parses the enclosed substring. The
//! result is a tagged outcome, not an error: callers decide whether malformed
//! output degrades the operation or fails it.

use serde_json::Value;

/// Outcome of trying to read a JSON object out of raw model text.
#[derive(Clone, Debug, PartialEq)]
pub enum JsonExtraction {
    /// A JSON value was found and parsed.
    Parsed(Value),
    /// No parseable object; the raw text is preserved for the caller.
    Malformed(String),
}

/// Extracts the outermost `{...}` object embedded in `raw`.
pub fn extract_json_object(raw: &str) -> JsonExtraction {
    let Some(start) = raw.find('{') else {
        return JsonExtraction::Malformed(raw.to_string());
    };
    let Some(end) = raw.rfind('}') else {
        return JsonExtraction::Malformed(raw.to_string());
    };
    if end < start {
        return JsonExtraction::Malformed(raw.to_string());
    }
    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(value) => JsonExtraction::Parsed(value),
        Err(_) => JsonExtraction::Malformed(raw.to_string()),
    }
}
