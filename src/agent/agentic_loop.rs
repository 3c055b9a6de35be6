//! Agentic tool-calling loop.
//!
//! Drives the LLM/tool execution round-trip: sends a request to the model,
//! executes any tool calls in the response, appends results, and repeats
//! until the model produces a final text response or the step budget is
//! spent.

use tracing::debug;

use super::executor::ToolExecutor;
use super::message::{ChatRequest, ChatResponse, tool_message};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Runs an agentic loop: model → tool calls → tool results → model → …
///
/// Every model reply (including the final one) and every tool result is
/// appended to `request.messages`, so on return (success or failure) the
/// request holds the full transcript produced so far.
///
/// Each model call and each round of tool execution costs one step.
///
/// # Errors
///
/// Returns [`AgentError::StepLimitExceeded`] if the model keeps requesting
/// tools past `max_steps`. Propagates any provider errors.
pub async fn agentic_loop(
    provider: &dyn LlmProvider,
    request: &mut ChatRequest,
    executor: &ToolExecutor<'_>,
    max_steps: usize,
) -> Result<ChatResponse, AgentError> {
    let mut steps = 0;

    loop {
        if steps >= max_steps {
            return Err(AgentError::StepLimitExceeded { max_steps });
        }

        let response = provider.chat(request).await?;
        steps += 1;
        request.messages.push(response.clone().into_message());

        // If no tool calls, we have a final answer
        if response.tool_calls.is_empty() {
            debug!(steps, "agentic loop completed with final text response");
            return Ok(response);
        }

        if steps >= max_steps {
            return Err(AgentError::StepLimitExceeded { max_steps });
        }

        debug!(
            steps,
            tool_count = response.tool_calls.len(),
            "executing tool calls"
        );

        for call in &response.tool_calls {
            let result = executor.execute(call).await;
            debug!(
                tool = call.name,
                call_id = call.id,
                is_error = result.is_error,
                "tool execution complete"
            );
            request
                .messages
                .push(tool_message(&result.tool_call_id, &result.content));
        }
        steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::{Role, system_message, user_message};
    use crate::agent::testing::{ScriptedProvider, StaticTool, api_error, text, tool_call};
    use crate::agent::tool::ToolSet;

    fn request() -> ChatRequest {
        ChatRequest {
            model: "test".to_string(),
            messages: vec![system_message("test"), user_message("query")],
            temperature: Some(0.2),
            max_tokens: None,
            tools: Vec::new(),
        }
    }

    fn search_tools() -> ToolSet {
        ToolSet::new(vec![Box::new(StaticTool::new(
            "tavily_search",
            "see https://example.com/a",
        ))])
    }

    #[tokio::test]
    async fn test_agentic_loop_single_tool_round() {
        let tools = search_tools();
        let executor = ToolExecutor::new(&tools);
        let provider = ScriptedProvider::new(vec![
            tool_call("call_0", "tavily_search", r#"{"query":"q"}"#),
            text("Final answer based on tool results."),
        ]);

        let mut request = request();
        let response = agentic_loop(&provider, &mut request, &executor, 80)
            .await
            .unwrap_or_else(|e| unreachable!("agentic_loop failed: {e}"));

        assert_eq!(response.content, "Final answer based on tool results.");
        // system + user + assistant(tool_calls) + tool(result) + assistant(final)
        assert_eq!(request.messages.len(), 5);
        assert_eq!(request.messages[2].tool_calls.len(), 1);
        assert_eq!(request.messages[3].role, Role::Tool);
        assert_eq!(request.messages[3].content, "see https://example.com/a");
        assert_eq!(request.messages[4].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_agentic_loop_no_tools() {
        let tools = ToolSet::none();
        let executor = ToolExecutor::new(&tools);
        let provider = ScriptedProvider::new(vec![text("Paris.")]);

        let mut request = request();
        let response = agentic_loop(&provider, &mut request, &executor, 80)
            .await
            .unwrap_or_else(|e| unreachable!("agentic_loop failed: {e}"));

        assert_eq!(response.content, "Paris.");
        assert_eq!(request.messages.len(), 3);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_agentic_loop_exceeds_step_budget() {
        let tools = search_tools();
        let executor = ToolExecutor::new(&tools);
        let provider = ScriptedProvider::new(
            (0..10)
                .map(|i| tool_call(&format!("call_{i}"), "tavily_search", "{}"))
                .collect(),
        );

        let mut request = request();
        let result = agentic_loop(&provider, &mut request, &executor, 4).await;
        assert!(
            matches!(result, Err(AgentError::StepLimitExceeded { max_steps: 4 })),
            "Expected StepLimitExceeded"
        );
        // 4 steps = 2 model calls + 2 tool rounds
        assert_eq!(provider.call_count(), 2);
        // Partial transcript is kept
        assert_eq!(request.messages.len(), 6);
    }

    #[tokio::test]
    async fn test_agentic_loop_provider_error_keeps_transcript() {
        let tools = search_tools();
        let executor = ToolExecutor::new(&tools);
        let provider = ScriptedProvider::new(vec![
            tool_call("call_0", "tavily_search", "{}"),
            api_error(),
        ]);

        let mut request = request();
        let result = agentic_loop(&provider, &mut request, &executor, 80).await;
        assert!(matches!(result, Err(AgentError::ApiRequest { .. })));
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[3].role, Role::Tool);
    }
}
