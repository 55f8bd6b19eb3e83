//! Text generation: the `TextGenerator` seam and its HTTP-backed implementation.

pub mod agent;
pub(crate) mod client;

pub use agent::{ChatAgent, TextGenerator};
pub use client::{ChatClient, ChatCompletionRequest};
