//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default bind address for `serve`.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default port for `serve`.
pub const DEFAULT_PORT: u16 = 9999;

/// groundline: web-grounded answers from a tool-calling LLM agent.
///
/// Runs a bounded reasoning loop with optional web search, then reconciles
/// the transcript into one clean Markdown answer with cited sources.
#[derive(Parser, Debug)]
#[command(name = "groundline")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the agent a question.
    ///
    /// Each MESSAGE is sent as a separate user message, in order; the last
    /// one is treated as the question.
    #[command(after_help = r#"Examples:
  groundline ask "What is the capital of France?"
  groundline ask --search "Latest Rust release notes"
  groundline ask -m llama-3.1-8b-instant --system-prompt "Reply in one line." "Why is the sky blue?"
  groundline --format json ask --search "AI news today" | jq -r .response
"#)]
    Ask {
        /// User messages, oldest first.
        #[arg(required = true)]
        messages: Vec<String>,

        /// Model identifier (defaults to GROUNDLINE_MODEL or llama-3.3-70b-versatile).
        #[arg(short, long)]
        model: Option<String>,

        /// Allow the agent to use web search.
        #[arg(short, long)]
        search: bool,

        /// System instructions for the agent.
        #[arg(long, default_value = "")]
        system_prompt: String,
    },

    /// Reconcile a recorded transcript without running the reasoning loop.
    ///
    /// The transcript is a JSON array of messages, either `{"role", "content",
    /// "tool_calls"}` objects or framework records such as `{"type": "ai",
    /// "content": [...]}`. When no --question is given, the transcript's
    /// user messages are used.
    #[command(after_help = r#"Examples:
  groundline reconcile transcript.json
  groundline reconcile transcript.json -q "What happened in markets today?"
"#)]
    Reconcile {
        /// Path to the transcript JSON file.
        transcript: PathBuf,

        /// Model used for synthesis.
        #[arg(short, long)]
        model: Option<String>,

        /// Original user message (repeatable; the last one is the question).
        #[arg(short = 'q', long = "question")]
        questions: Vec<String>,
    },

    /// Start the HTTP endpoint.
    #[command(after_help = r#"Examples:
  groundline serve                          # Listen on 127.0.0.1:9999
  groundline serve --host 0.0.0.0 --port 8080
"#)]
    Serve {
        /// Host to bind.
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        /// Port to bind.
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}
