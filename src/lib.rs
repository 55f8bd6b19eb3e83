//! trip-request-agent: turn natural-language trip requests into structured data
//!
//! A language model is asked to extract a fixed trip schema and to report
//! whether the request is complete. This crate decodes that self-report
//! tolerantly into a [`ParseOutcome`], serves it over HTTP, and ships a photo
//! search tool for the planning agent.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trip_request_agent::{ChatAgent, ParseOutcome, RequestParser};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api_key = std::env::var("LLM_API_KEY")?;
//!     let parser = RequestParser::new(Arc::new(ChatAgent::new(api_key)));
//!
//!     match parser.parse("下周末去杭州玩两天，高铁往返，住西湖边的民宿").await {
//!         ParseOutcome::Complete { data } => println!("ready: {data:?}"),
//!         ParseOutcome::Incomplete { missing_fields, .. } => println!("need: {missing_fields:?}"),
//!         ParseOutcome::Error { message, .. } => println!("failed: {message}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod parser;
pub mod server;
pub mod tools;
pub mod types;

pub use config::Settings;
pub use error::{AgentError, Result};
pub use llm::{ChatAgent, TextGenerator};
pub use parser::{extract, ExtractionFailure, RequestParser, REQUEST_PARSER_PROMPT};
pub use server::{build_router, AppState};
pub use tools::{FunctionFactory, Tool, UnsplashTool};
pub use types::{ParseOutcome, ParseRequestInput, ParseRequestResponse, TripRequest};

#[cfg(feature = "cli")]
pub mod cli;
