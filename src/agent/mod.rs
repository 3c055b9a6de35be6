//! LLM agent pipeline.
//!
//! Answers a user through two stages: a bounded reasoning loop with an
//! optional web-search tool, followed by reconciliation of the resulting
//! transcript into a single clean Markdown answer.
//!
//! # Architecture
//!
//! ```text
//! caller (model, messages, allow_search, system_prompt) → Orchestrator
//!   ├── ReasoningDriver
//!   │   ├── tool set (TavilySearch, or empty)
//!   │   └── agentic_loop: model ↔ tools, capped at max_steps
//!   └── Reconciler
//!       ├── fast path: clean final answer, no tools used
//!       └── synthesis: findings + source whitelist → JSON → Markdown
//! ```

pub mod agentic_loop;
pub mod client;
pub mod config;
pub mod executor;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod reasoning;
pub mod reconcile;
pub mod search;
pub mod synthesis;
pub mod tool;
pub mod transcript;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types
pub use client::create_provider;
pub use config::AgentConfig;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::Orchestrator;
pub use prompt::APOLOGY;
pub use provider::LlmProvider;
pub use reasoning::{ReasoningDriver, ToolBuilder};
pub use reconcile::Reconciler;
pub use search::TavilySearch;
pub use synthesis::{SynthesisResult, Synthesizer};
pub use tool::{Tool, ToolCall, ToolDefinition, ToolResult, ToolSet};
pub use transcript::TranscriptMessage;
