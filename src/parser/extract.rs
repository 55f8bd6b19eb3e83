//! Best-effort recovery of a JSON object from free-form model output.
//!
//! Candidates are chosen in a fixed order, first match wins:
//!
//! 1. the body of the first ```` ```json ```` fence,
//! 2. the body of the first bare ```` ``` ```` fence,
//! 3. the span from the first `{` to the last `}` (inclusive),
//! 4. the whole text.
//!
//! The chosen candidate is parsed once. Malformed JSON is never repaired;
//! it is reported as an [`ExtractionFailure`] so the caller can classify it.
//!
//! Step 3 is greedy: a reply holding two separate objects produces a span
//! that is not valid JSON and therefore fails.

use serde_json::{Map, Value};
use thiserror::Error;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Why no JSON object could be recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The candidate was not valid JSON
    InvalidJson(String),
    /// The candidate was valid JSON but not an object
    NotAnObject,
}

/// The reply did not contain a usable JSON object. Carries the untouched
/// reply text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no JSON object found in model reply: {reason}")]
pub struct ExtractionFailure {
    pub raw_text: String,
    pub reason: FailureReason,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::InvalidJson(detail) => write!(f, "invalid JSON ({detail})"),
            FailureReason::NotAnObject => write!(f, "JSON value is not an object"),
        }
    }
}

/// Extract and parse the JSON object embedded in `raw_text`.
pub fn extract(raw_text: &str) -> Result<Map<String, Value>, ExtractionFailure> {
    let candidate = candidate_span(raw_text);

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ExtractionFailure {
            raw_text: raw_text.to_string(),
            reason: FailureReason::NotAnObject,
        }),
        Err(err) => Err(ExtractionFailure {
            raw_text: raw_text.to_string(),
            reason: FailureReason::InvalidJson(err.to_string()),
        }),
    }
}

/// Pick the substring that should hold the JSON payload.
pub fn candidate_span(raw_text: &str) -> &str {
    if let Some(body) = fenced_body(raw_text, JSON_FENCE) {
        return body;
    }

    if let Some(body) = fenced_body(raw_text, FENCE) {
        return body;
    }

    if let (Some(start), Some(end)) = (raw_text.find('{'), raw_text.rfind('}')) {
        // A `}` before the first `{` leaves nothing to parse.
        return if end >= start {
            &raw_text[start..=end]
        } else {
            ""
        };
    }

    raw_text
}

/// Text between the first `opening` marker and the next bare fence after it,
/// trimmed. An unterminated fence runs to the end of the text minus its
/// final character, so a reply cut off mid-object does not parse.
fn fenced_body<'a>(raw_text: &'a str, opening: &str) -> Option<&'a str> {
    let start = raw_text.find(opening)? + opening.len();
    let rest = &raw_text[start..];
    let body = match rest.find(FENCE) {
        Some(end) => &rest[..end],
        None => rest
            .char_indices()
            .last()
            .map_or(rest, |(last, _)| &rest[..last]),
    };
    Some(body.trim())
}
