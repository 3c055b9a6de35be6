//! Error types for groundline.
//!
//! [`AgentError`] covers everything that can go wrong while talking to the
//! model, the search tool, or while parsing structured output. Most of these
//! are recovered inside the pipeline; only configuration errors reach the
//! caller. [`CommandError`] is raised by the CLI layer.

use thiserror::Error;

/// Crate-level result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Agent, provider, or tool failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the agent system.
#[derive(Error, Debug)]
pub enum AgentError {
    /// No model API key was configured.
    #[error("API key missing: set GROQ_API_KEY (or OPENAI_API_KEY / GROUNDLINE_API_KEY)")]
    ApiKeyMissing,

    /// Unknown provider name in configuration.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// The configured provider name.
        name: String,
    },

    /// The model or search API rejected or failed the request.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Error detail from the client.
        message: String,
        /// HTTP status, when known.
        status: Option<u16>,
    },

    /// The reasoning loop used up its step budget.
    #[error("reasoning loop exceeded {max_steps} steps")]
    StepLimitExceeded {
        /// Configured step cap.
        max_steps: usize,
    },

    /// A tool call failed.
    #[error("tool '{name}' failed: {message}")]
    ToolExecution {
        /// Tool name.
        name: String,
        /// Failure detail.
        message: String,
    },

    /// A tool could not be constructed (e.g. missing credentials).
    #[error("tool '{name}' unavailable: {reason}")]
    ToolUnavailable {
        /// Tool name.
        name: String,
        /// Why construction failed.
        reason: String,
    },

    /// Model output did not match the required structure.
    #[error("failed to parse model response: {message}")]
    ResponseParse {
        /// Parse failure detail.
        message: String,
        /// The raw content that failed to parse.
        content: String,
    },

    /// The requested model is not on the allow-list.
    #[error("model not allowed: {model}")]
    ModelNotAllowed {
        /// Requested model identifier.
        model: String,
    },
}

/// Errors raised by CLI commands.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command could not run to completion.
    #[error("{0}")]
    ExecutionFailed(String),

    /// A command argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
