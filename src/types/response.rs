use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{outcome::ParseOutcome, trip::TripRequest};
use crate::error::{AgentError, Result};

pub const COMPLETE_MESSAGE: &str = "信息完整，可以开始规划旅行";
pub const INCOMPLETE_MESSAGE: &str = "请补充必要信息";

/// External response body of `POST /request/parse-request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseRequestResponse {
    pub success: bool,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_request: Option<TripRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_data: Option<Map<String, Value>>,
    pub message: String,
}

impl ParseRequestResponse {
    /// Translate a parse outcome into the external contract.
    ///
    /// Fails only when a `complete` payload cannot be read as a `TripRequest`,
    /// which means the model broke its output contract.
    pub fn from_outcome(outcome: ParseOutcome) -> Result<Self> {
        let response = match outcome {
            ParseOutcome::Complete { data } => Self {
                success: true,
                status: "complete".to_string(),
                trip_request: Some(trip_request_from_map(data)?),
                missing_fields: None,
                suggestions: None,
                partial_data: None,
                message: COMPLETE_MESSAGE.to_string(),
            },
            ParseOutcome::Incomplete {
                missing_fields,
                suggestions,
                partial_data,
            } => Self {
                success: true,
                status: "incomplete".to_string(),
                trip_request: None,
                missing_fields: Some(missing_fields),
                suggestions: Some(suggestions),
                partial_data: Some(partial_data),
                message: INCOMPLETE_MESSAGE.to_string(),
            },
            ParseOutcome::Error { message, .. } => Self {
                success: false,
                status: "error".to_string(),
                trip_request: None,
                missing_fields: None,
                suggestions: None,
                partial_data: None,
                message,
            },
        };

        Ok(response)
    }
}

/// Read a `complete` payload into a typed request, naming the offending
/// field when it does not fit.
pub fn trip_request_from_map(data: Map<String, Value>) -> Result<TripRequest> {
    let value = Value::Object(data);
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        let location = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        AgentError::Validation(format!(
            "failed to deserialize `TripRequest` at {}: {}",
            location,
            err.inner()
        ))
    })
}
