use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use super::extract::extract;
use super::prompt::REQUEST_PARSER_PROMPT;
use crate::llm::TextGenerator;
use crate::types::ParseOutcome;

pub const RETRY_DESCRIPTION_MESSAGE: &str = "解析失败，请重新描述您的需求";
pub const GENERIC_FAILURE_MESSAGE: &str = "解析失败";

/// Turns free-form trip descriptions into a [`ParseOutcome`].
///
/// The struct is read-only after construction, so one instance can be shared
/// across concurrent requests.
#[derive(Clone)]
pub struct RequestParser {
    generator: Arc<dyn TextGenerator>,
    system_prompt: String,
}

impl std::fmt::Debug for RequestParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestParser")
            .field("system_prompt_chars", &self.system_prompt.chars().count())
            .finish_non_exhaustive()
    }
}

impl RequestParser {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            system_prompt: REQUEST_PARSER_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Parse one user request. Every failure ends up as `ParseOutcome::Error`.
    pub async fn parse(&self, user_text: &str) -> ParseOutcome {
        info!(
            target: "trip_agent::parser",
            input = %preview(user_text, 100),
            "parsing user request"
        );

        let raw_text = match self.generator.generate(&self.system_prompt, user_text).await {
            Ok(text) => text,
            Err(err) => {
                warn!(target: "trip_agent::parser", error = %err, "text generation failed");
                return ParseOutcome::error(format!("{GENERIC_FAILURE_MESSAGE}: {err}"));
            }
        };

        let outcome = classify_reply(&raw_text);
        match &outcome {
            ParseOutcome::Error { .. } => warn!(
                target: "trip_agent::parser",
                reply = %preview(&raw_text, 200),
                "model reply could not be classified"
            ),
            other => info!(
                target: "trip_agent::parser",
                status = other.status(),
                "request parsed"
            ),
        }
        outcome
    }
}

/// Decode a raw model reply into an outcome.
pub fn classify_reply(raw_text: &str) -> ParseOutcome {
    match extract(raw_text) {
        Ok(payload) => classify_payload(payload),
        Err(failure) => ParseOutcome::Error {
            message: RETRY_DESCRIPTION_MESSAGE.to_string(),
            raw_response: Some(failure.raw_text),
        },
    }
}

/// Classify an extracted payload by its self-reported `status`.
///
/// Field values are taken as the model wrote them; absent or mistyped
/// optional keys fall back to empty defaults.
pub fn classify_payload(mut payload: Map<String, Value>) -> ParseOutcome {
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_string);

    match status.as_deref() {
        Some("complete") => ParseOutcome::Complete {
            data: take_object(&mut payload, "data"),
        },
        Some("incomplete") => ParseOutcome::Incomplete {
            missing_fields: payload
                .get("missing_fields")
                .and_then(Value::as_array)
                .map(|fields| {
                    fields
                        .iter()
                        .filter_map(|field| field.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
            suggestions: payload
                .get("suggestions")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default(),
            partial_data: take_object(&mut payload, "partial_data"),
        },
        _ => ParseOutcome::error(
            payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(GENERIC_FAILURE_MESSAGE),
        ),
    }
}

fn take_object(payload: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match payload.remove(key) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().nth(max_chars).is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AgentError, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replies with a fixed text and remembers what it was asked.
    struct CannedGenerator {
        reply: Result<String>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl CannedGenerator {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(AgentError::Http(message.to_string())),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, system_prompt: &str, user_text: &str) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_text.to_string()));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(err) => Err(AgentError::Http(err.to_string())),
            }
        }
    }

    fn parser_with(generator: CannedGenerator) -> (RequestParser, Arc<CannedGenerator>) {
        let generator = Arc::new(generator);
        (RequestParser::new(generator.clone()), generator)
    }

    #[tokio::test]
    async fn test_complete_returns_data_verbatim() {
        let data = json!({
            "city": "北京",
            "start_date": "2025-06-01",
            "end_date": "2025-06-03",
            "travel_days": 3,
            "transportation": "公共交通",
            "accommodation": "经济型酒店"
        });
        let reply = format!(
            "```json\n{}\n```",
            json!({"status": "complete", "data": data})
        );
        let (parser, generator) = parser_with(CannedGenerator::ok(&reply));

        let outcome = parser.parse("下周去北京玩3天，坐地铁，住经济型酒店").await;
        assert_eq!(
            outcome,
            ParseOutcome::Complete {
                data: data.as_object().cloned().unwrap()
            }
        );

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, REQUEST_PARSER_PROMPT);
        assert_eq!(seen[0].1, "下周去北京玩3天，坐地铁，住经济型酒店");
    }

    #[tokio::test]
    async fn test_incomplete_fills_defaults() {
        let (parser, _) = parser_with(CannedGenerator::ok(
            r#"{"status":"incomplete","missing_fields":["start_date"]}"#,
        ));
        let outcome = parser.parse("去北京").await;
        assert_eq!(
            outcome,
            ParseOutcome::Incomplete {
                missing_fields: vec!["start_date".to_string()],
                suggestions: String::new(),
                partial_data: Map::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_incomplete_keeps_partial_data() {
        let (parser, _) = parser_with(CannedGenerator::ok(
            r#"```
{"status":"incomplete","missing_fields":["start_date","end_date"],"suggestions":"请提供具体的旅行日期","partial_data":{"city":"北京","preferences":["美食"]}}
```"#,
        ));
        match parser.parse("去北京吃好吃的").await {
            ParseOutcome::Incomplete {
                missing_fields,
                suggestions,
                partial_data,
            } => {
                assert_eq!(missing_fields, vec!["start_date", "end_date"]);
                assert_eq!(suggestions, "请提供具体的旅行日期");
                assert_eq!(partial_data["city"], "北京");
            }
            other => panic!("expected incomplete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_json_reply() {
        let (parser, _) = parser_with(CannedGenerator::ok("I'm sorry, I don't understand"));
        assert_eq!(
            parser.parse("???").await,
            ParseOutcome::Error {
                message: RETRY_DESCRIPTION_MESSAGE.to_string(),
                raw_response: Some("I'm sorry, I don't understand".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_status_is_error() {
        let (parser, _) = parser_with(CannedGenerator::ok(r#"{"status":"unknown_value"}"#));
        let outcome = parser.parse("hi").await;
        assert_eq!(outcome, ParseOutcome::error(GENERIC_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn test_error_status_uses_model_message() {
        let (parser, _) = parser_with(CannedGenerator::ok(
            r#"{"status":"error","message":"无法识别目的地"}"#,
        ));
        assert_eq!(parser.parse("hi").await, ParseOutcome::error("无法识别目的地"));
    }

    #[tokio::test]
    async fn test_generation_failure_becomes_error() {
        let (parser, _) = parser_with(CannedGenerator::failing("connection refused"));
        match parser.parse("去上海").await {
            ParseOutcome::Error {
                message,
                raw_response,
            } => {
                assert!(message.starts_with("解析失败: "));
                assert!(message.contains("connection refused"));
                assert!(raw_response.is_none());
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_custom_system_prompt_is_sent() {
        let (parser, generator) = parser_with(CannedGenerator::ok("{}"));
        let parser = parser.with_system_prompt("only json");
        parser.parse("x").await;
        assert_eq!(generator.seen.lock().unwrap()[0].0, "only json");
    }

    #[test]
    fn test_missing_status_is_error() {
        assert_eq!(
            classify_payload(json!({"data": {}}).as_object().cloned().unwrap()),
            ParseOutcome::error(GENERIC_FAILURE_MESSAGE)
        );
    }

    #[test]
    fn test_complete_without_data_yields_empty_map() {
        let outcome = classify_reply(r#"{"status":"complete"}"#);
        assert_eq!(outcome, ParseOutcome::Complete { data: Map::new() });
    }

    #[test]
    fn test_greedy_span_reply_is_error() {
        let outcome = classify_reply("noise {\"a\":1} more {\"b\":2} noise");
        assert_eq!(outcome.status(), "error");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("北京上海", 2), "北京...");
        assert_eq!(preview("北京", 2), "北京");
    }
}
