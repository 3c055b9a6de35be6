//! Orchestrator for the reason-then-reconcile pipeline.
//!
//! One call runs the reasoning loop (model, optional search tool, bounded
//! steps) and then reconciles the transcript into a single answer. No state
//! survives between calls beyond the shared provider and configuration.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use super::config::AgentConfig;
use super::provider::LlmProvider;
use super::reasoning::{ReasoningDriver, ToolBuilder, search_tool_builder};
use super::reconcile::Reconciler;
use super::transcript::TranscriptMessage;
use crate::core::{TextCleaner, default_cleaner};

/// Drives one request from the caller's messages to the final answer.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
    cleaner: Box<dyn TextCleaner>,
    tool_builder: ToolBuilder,
}

impl Orchestrator {
    /// Creates an orchestrator with the default cleaner and the Tavily search tool.
    pub fn new(provider: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        Self {
            provider,
            config,
            cleaner: default_cleaner(),
            tool_builder: search_tool_builder(),
        }
    }

    /// Replaces the tool builder.
    #[must_use]
    pub fn with_tool_builder(mut self, tool_builder: ToolBuilder) -> Self {
        self.tool_builder = tool_builder;
        self
    }

    /// Replaces the tool-output cleaner.
    #[must_use]
    pub fn with_cleaner(mut self, cleaner: Box<dyn TextCleaner>) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Answers the caller's messages.
    ///
    /// Never fails: the worst case is a fixed apology string.
    pub async fn respond(
        &self,
        model: &str,
        messages: &[String],
        allow_search: bool,
        system_prompt: &str,
    ) -> String {
        let start = Instant::now();
        let driver = ReasoningDriver::new(self.provider.as_ref(), &self.config, &self.tool_builder);
        let transcript = driver
            .run(model, messages, allow_search, system_prompt)
            .await;
        let answer = self.reconcile_transcript(model, &transcript, messages).await;

        info!(
            model,
            provider = self.provider.name(),
            allow_search,
            transcript_len = transcript.len(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "request answered"
        );
        answer
    }

    /// Reconciles an existing transcript without running the reasoning loop.
    pub async fn reconcile_transcript(
        &self,
        model: &str,
        transcript: &[TranscriptMessage],
        messages: &[String],
    ) -> String {
        Reconciler::new(self.provider.as_ref(), &self.config, self.cleaner.as_ref())
            .reconcile(model, transcript, messages)
            .await
    }
}
