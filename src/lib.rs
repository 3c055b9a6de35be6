//! # groundline
//!
//! Grounded answers from a tool-using LLM agent.
//!
//! A request runs through two stages:
//!
//! 1. **Reasoning**: the model runs in a bounded tool-calling loop, with a
//!    Tavily web-search tool when the caller allows it.
//! 2. **Reconciliation**: the transcript is inspected. A clean final answer
//!    produced without tools is returned as-is. Otherwise the tool findings
//!    are cleaned, their URLs become a citation whitelist, and the model is
//!    asked for a structured answer rendered as Markdown with **Key points**
//!    and **References** sections.
//!
//! The entry point never fails: provider, tool, and parse errors degrade to
//! the best available text and, as a last resort, a fixed apology.
//!
//! ## Example
//!
//! ```no_run
//! use groundline::agent::{AgentConfig, Orchestrator, create_provider};
//!
//! # async fn run() -> Result<(), groundline::error::AgentError> {
//! let config = AgentConfig::from_env()?;
//! let provider = create_provider(&config)?;
//! let orchestrator = Orchestrator::new(provider, config);
//! let answer = orchestrator
//!     .respond(
//!         "llama-3.3-70b-versatile",
//!         &["What changed in the latest Rust release?".to_string()],
//!         true,
//!         "Answer concisely.",
//!     )
//!     .await;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod error;
pub mod server;

pub use agent::{AgentConfig, Orchestrator};
pub use error::{AgentError, Error, Result};
