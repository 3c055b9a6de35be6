//! Reasoning stage: seeds a conversation and runs the tool-calling loop.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::agentic_loop::agentic_loop;
use super::config::AgentConfig;
use super::executor::ToolExecutor;
use super::message::{ChatMessage, ChatRequest, system_message, user_message};
use super::provider::LlmProvider;
use super::search::TavilySearch;
use super::tool::ToolSet;
use super::transcript::TranscriptMessage;
use crate::error::AgentError;

/// Builds the tool set for one call.
pub type ToolBuilder = Arc<dyn Fn(&AgentConfig) -> Result<ToolSet, AgentError> + Send + Sync>;

/// The default tool builder: a single Tavily search tool.
pub fn search_tool_builder() -> ToolBuilder {
    Arc::new(|config: &AgentConfig| -> Result<ToolSet, AgentError> {
        Ok(ToolSet::new(vec![Box::new(TavilySearch::from_config(config)?)]))
    })
}

/// Seeds the conversation: optional system message, then one user message
/// per caller string, in order.
pub fn seed_messages(system_prompt: &str, messages: &[String]) -> Vec<ChatMessage> {
    let mut seeded = Vec::with_capacity(messages.len() + 1);
    if !system_prompt.trim().is_empty() {
        seeded.push(system_message(system_prompt));
    }
    seeded.extend(messages.iter().map(|m| user_message(m)));
    seeded
}

/// Runs the reasoning loop for one request.
pub struct ReasoningDriver<'a> {
    provider: &'a dyn LlmProvider,
    config: &'a AgentConfig,
    tool_builder: &'a ToolBuilder,
}

impl<'a> ReasoningDriver<'a> {
    /// Creates a driver.
    #[must_use]
    pub const fn new(
        provider: &'a dyn LlmProvider,
        config: &'a AgentConfig,
        tool_builder: &'a ToolBuilder,
    ) -> Self {
        Self {
            provider,
            config,
            tool_builder,
        }
    }

    /// Builds the tool set, or an empty one if search is off or construction fails.
    pub fn make_tools(&self, allow_search: bool) -> ToolSet {
        if !allow_search {
            return ToolSet::none();
        }
        match (self.tool_builder)(self.config) {
            Ok(tools) => tools,
            Err(e) => {
                warn!(error = %e, "search tool unavailable, continuing without tools");
                ToolSet::none()
            }
        }
    }

    /// Runs the loop and returns the transcript.
    ///
    /// A loop failure (provider error or step cap) is logged and the
    /// partial transcript is returned for reconciliation.
    pub async fn run(
        &self,
        model: &str,
        messages: &[String],
        allow_search: bool,
        system_prompt: &str,
    ) -> Vec<TranscriptMessage> {
        let tools = self.make_tools(allow_search);
        let executor = ToolExecutor::new(&tools);

        let mut request = ChatRequest {
            model: model.to_string(),
            messages: seed_messages(system_prompt, messages),
            temperature: Some(self.config.temperature),
            max_tokens: None,
            tools: tools.definitions(),
        };

        debug!(
            model,
            tools = tools.len(),
            seeded = request.messages.len(),
            "starting reasoning loop"
        );

        match agentic_loop(self.provider, &mut request, &executor, self.config.max_steps).await {
            Ok(response) => info!(
                tokens = response.usage.total_tokens,
                messages = request.messages.len(),
                "reasoning loop finished"
            ),
            Err(e) => warn!(
                error = %e,
                messages = request.messages.len(),
                "reasoning loop stopped early, keeping partial transcript"
            ),
        }

        request
            .messages
            .into_iter()
            .map(TranscriptMessage::from)
            .collect()
    }
}
