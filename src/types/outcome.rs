use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of parsing one natural-language request.
///
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseOutcome {
    /// The model reported every required field
    Complete { data: Map<String, Value> },
    /// The model reported missing fields and what to ask the user
    Incomplete {
        missing_fields: Vec<String>,
        suggestions: String,
        partial_data: Map<String, Value>,
    },
    /// The reply could not be decoded or classified
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        raw_response: Option<String>,
    },
}

impl ParseOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        ParseOutcome::Error {
            message: message.into(),
            raw_response: None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            ParseOutcome::Complete { .. } => "complete",
            ParseOutcome::Incomplete { .. } => "incomplete",
            ParseOutcome::Error { .. } => "error",
        }
    }
}
