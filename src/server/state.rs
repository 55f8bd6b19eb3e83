use std::sync::Arc;

use crate::config::Settings;
use crate::error::Result;
use crate::llm::{ChatAgent, TextGenerator};
use crate::parser::RequestParser;

/// Application-scoped context shared by every handler.
///
/// The parser is built once at startup. If that fails the server still comes
/// up so the health endpoint can report why, and parse calls answer with 500.
#[derive(Clone, Debug)]
pub struct AppState {
    parser: std::result::Result<Arc<RequestParser>, Arc<str>>,
}

impl AppState {
    pub fn new(parser: RequestParser) -> Self {
        Self {
            parser: Ok(Arc::new(parser)),
        }
    }

    /// State whose parser could not be constructed
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            parser: Err(Arc::from(reason.into())),
        }
    }

    pub fn from_generator(generator: Arc<dyn TextGenerator>) -> Self {
        Self::new(RequestParser::new(generator))
    }

    /// Build the LLM-backed parser from settings, keeping the failure for
    /// later reporting instead of aborting.
    pub fn from_settings(settings: &Settings) -> Self {
        match build_parser(settings) {
            Ok(parser) => Self::new(parser),
            Err(err) => {
                tracing::error!(
                    target: "trip_agent::server",
                    error = %err,
                    "failed to initialise request parser"
                );
                Self::unavailable(err.to_string())
            }
        }
    }

    pub fn parser(&self) -> std::result::Result<&Arc<RequestParser>, &str> {
        self.parser.as_ref().map_err(|reason| &**reason)
    }

    pub fn is_ready(&self) -> bool {
        self.parser.is_ok()
    }
}

fn build_parser(settings: &Settings) -> Result<RequestParser> {
    let agent = ChatAgent::from_settings(settings)?;
    tracing::info!(
        target: "trip_agent::server",
        model = agent.model(),
        "request parser initialised"
    );
    Ok(RequestParser::new(Arc::new(agent)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_makes_state_unavailable() {
        let state = AppState::from_settings(&Settings::default());
        assert!(!state.is_ready());
        assert!(state.parser().unwrap_err().contains("LLM_API_KEY"));
    }

    #[test]
    fn test_configured_state_is_ready() {
        let settings = Settings {
            llm_api_key: Some("key".to_string()),
            ..Settings::default()
        };
        assert!(AppState::from_settings(&settings).is_ready());
    }
}
