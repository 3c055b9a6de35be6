//! CLI layer for groundline.
//!
//! Provides the command-line interface using clap, with commands for
//! asking the agent, replaying transcripts, and serving HTTP.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
