//! Tool executor that dispatches tool calls to the bound [`ToolSet`].
//!
//! Failures never abort the loop: they come back as error [`ToolResult`]s
//! so the model can see what went wrong and answer anyway.

use super::tool::{ToolCall, ToolResult, ToolSet};
use crate::error::AgentError;

/// Maximum raw byte length of tool argument JSON from the LLM.
const MAX_TOOL_ARGS_LEN: usize = 100_000;

/// Executes tool calls against a tool set.
#[derive(Debug)]
pub struct ToolExecutor<'a> {
    tools: &'a ToolSet,
}

impl<'a> ToolExecutor<'a> {
    /// Creates a new executor over the given tools.
    #[must_use]
    pub const fn new(tools: &'a ToolSet) -> Self {
        Self { tools }
    }

    /// Dispatches a tool call to the matching tool.
    ///
    /// Validates raw argument size before dispatch to prevent oversized payloads.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        if call.arguments.len() > MAX_TOOL_ARGS_LEN {
            return ToolResult {
                tool_call_id: call.id.clone(),
                content: format!(
                    "tool arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
                    call.arguments.len()
                ),
                is_error: true,
            };
        }

        let result = match self.tools.get(&call.name) {
            Some(tool) => tool.call(&call.arguments).await,
            None => Err(AgentError::ToolExecution {
                name: call.name.clone(),
                message: "unknown tool".to_string(),
            }),
        };

        match result {
            Ok(content) => ToolResult {
                tool_call_id: call.id.clone(),
                content,
                is_error: false,
            },
            Err(e) => ToolResult {
                tool_call_id: call.id.clone(),
                content: e.to_string(),
                is_error: true,
            },
        }
    }
}
