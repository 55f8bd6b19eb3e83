//! Environment-driven settings for the LLM backend, the photo tool and the
//! HTTP listener.

use crate::error::{AgentError, Result};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-4.1-mini";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Clone, Debug)]
pub struct Settings {
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    /// Unset means the LLM call may block for as long as the remote side takes.
    pub llm_timeout: Option<Duration>,
    pub unsplash_access_key: Option<String>,
    pub host: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm_api_key: None,
            llm_base_url: DEFAULT_BASE_URL.to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            llm_timeout: None,
            unsplash_access_key: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Read settings from the process environment. Call `dotenvy::dotenv()`
    /// first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let llm_timeout = match first_set(&lookup, &["LLM_TIMEOUT"]) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    AgentError::Config(format!(
                        "LLM_TIMEOUT must be a whole number of seconds, got `{raw}`"
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let port = match first_set(&lookup, &["PORT"]) {
            Some(raw) => raw.trim().parse().map_err(|_| {
                AgentError::Config(format!("PORT must be a valid port number, got `{raw}`"))
            })?,
            None => defaults.port,
        };

        Ok(Self {
            llm_api_key: first_set(&lookup, &["LLM_API_KEY", "OPENAI_API_KEY"]),
            llm_base_url: first_set(
                &lookup,
                &["LLM_BASE_URL", "OPENAI_BASE_URL", "OPENROUTER_BASE_URL"],
            )
            .unwrap_or(defaults.llm_base_url),
            llm_model: first_set(&lookup, &["LLM_MODEL_ID"]).unwrap_or(defaults.llm_model),
            llm_timeout,
            unsplash_access_key: first_set(&lookup, &["UNSPLASH_ACCESS_KEY"]),
            host: first_set(&lookup, &["HOST"]).unwrap_or(defaults.host),
            port,
        })
    }

    /// The LLM key, or a configuration error naming the variables to set.
    pub fn require_llm_api_key(&self) -> Result<&str> {
        self.llm_api_key.as_deref().ok_or_else(|| {
            AgentError::Config(
                "LLM_API_KEY (or OPENAI_API_KEY) environment variable must be set".to_string(),
            )
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// First non-blank value among `keys`, in order.
fn first_set<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_empty() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings.llm_base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.llm_model, DEFAULT_MODEL);
        assert_eq!(settings.port, DEFAULT_PORT);
        assert!(settings.llm_timeout.is_none());
        assert!(settings.require_llm_api_key().is_err());
    }

    #[test]
    fn test_fallback_keys() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:1234/v1"),
            ("LLM_TIMEOUT", "30"),
            ("PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(settings.require_llm_api_key().unwrap(), "sk-test");
        assert_eq!(settings.llm_base_url, "http://localhost:1234/v1");
        assert_eq!(settings.llm_timeout, Some(Duration::from_secs(30)));
        assert_eq!(settings.bind_address(), "0.0.0.0:9000");
    }

    #[test]
    fn test_primary_key_wins() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("LLM_API_KEY", "primary"),
            ("OPENAI_API_KEY", "fallback"),
        ]))
        .unwrap();
        assert_eq!(settings.llm_api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn test_invalid_port() {
        let err = Settings::from_lookup(lookup_from(&[("PORT", "http")])).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
