//! Natural-language trip request parsing.

pub mod extract;
pub mod prompt;
pub mod service;

pub use extract::{extract, ExtractionFailure, FailureReason};
pub use prompt::REQUEST_PARSER_PROMPT;
pub use service::{classify_payload, classify_reply, RequestParser};
