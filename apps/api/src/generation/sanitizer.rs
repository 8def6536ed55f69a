//! Response sanitizer: pulls one JSON object out of free-form model text.
//!
//! Two stages: [`extract_json_span`] picks the most likely object substring (code fences,
//! surrounding prose and trailing junk removed), then [`parse_deck_json`] strictly parses it.
//! A decode failure is returned to the caller, never defaulted.

use serde_json::{Map, Value};
use thiserror::Error;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("model output is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("model output is JSON but not an object")]
    NotAnObject,
}

/// Returns the substring most likely to be the JSON object in `text`.
pub fn extract_json_span(text: &str) -> &str {
    let mut span = text.trim();

    if let Some(open) = span.find(JSON_FENCE) {
        let start = open + JSON_FENCE.len();
        span = match span[start..].find(FENCE) {
            Some(len) => &span[start..start + len],
            None => &span[start..],
        };
        span = span.trim();
    }

    if let Some(rest) = span.strip_prefix(FENCE) {
        span = rest.trim();
    }
    if let Some(rest) = span.strip_suffix(FENCE) {
        span = rest.trim();
    }

    if let Some(start) = span.find('{') {
        if let Some(end) = matching_brace(span, start) {
            span = &span[start..=end];
        }
    }

    span
}

/// Byte index of the `}` closing the `{` at `start`, counting depth outside string literals.
/// Braces inside quoted values are ignored, so `{"note": "use }"}` is kept whole where a plain
/// depth count over every brace would cut it at the first `}`.
fn matching_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extracts and strictly parses the deck object from raw model text.
pub fn parse_deck_json(text: &str) -> Result<Map<String, Value>, SanitizeError> {
    match serde_json::from_str::<Value>(extract_json_span(text))? {
        Value::Object(map) => Ok(map),
        _ => Err(SanitizeError::NotAnObject),
    }
}
