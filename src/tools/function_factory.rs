use super::{tool::ToolRegistry, Tool};
use crate::{AgentError, Result};
use serde_json::Value;
use tracing::{debug, warn};

/// Dispatches tool calls by name
#[derive(Debug, Default)]
pub struct FunctionFactory {
    registry: ToolRegistry,
}

impl FunctionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool with the factory
    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) {
        debug!(target: "trip_agent::tools", tool = tool.name(), "registering tool");
        self.registry.register(tool);
    }

    /// Execute a function call by name
    pub async fn execute_function(&self, function_name: &str, parameters: Value) -> Result<Value> {
        let tool = self
            .registry
            .get(function_name)
            .ok_or_else(|| AgentError::ToolNotFound(function_name.to_string()))?;

        tool.execute(parameters).await.map_err(|err| {
            warn!(target: "trip_agent::tools", tool = function_name, error = %err, "tool failed");
            err
        })
    }

    /// Get all available tools for OpenAI function calling
    pub fn get_openai_tools(&self) -> Vec<Value> {
        self.registry.to_openai_tools()
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.registry.get(name).is_some()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.registry.names()
    }
}
