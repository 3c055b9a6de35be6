//! CLI command implementations.
//!
//! Contains the business logic for each CLI command. Async work runs on a
//! tokio runtime created per command.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::agent::client::create_provider;
use crate::agent::config::AgentConfig;
use crate::agent::orchestrator::Orchestrator;
use crate::agent::transcript::TranscriptMessage;
use crate::cli::output::{OutputFormat, format_response};
use crate::cli::parser::{Cli, Commands};
use crate::error::{CommandError, Result};

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, the transcript cannot
/// be read, or the server fails.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Ask {
            messages,
            model,
            search,
            system_prompt,
        } => cmd_ask(messages, model.as_deref(), *search, system_prompt, format),
        Commands::Reconcile {
            transcript,
            model,
            questions,
        } => cmd_reconcile(transcript, model.as_deref(), questions, format),
        Commands::Serve { host, port } => cmd_serve(host, *port),
    }
}

/// Builds the orchestrator from environment configuration.
fn build_orchestrator() -> Result<Orchestrator> {
    let config = AgentConfig::from_env().map_err(|e| {
        CommandError::ExecutionFailed(format!("Agent configuration error: {e}"))
    })?;

    let provider = create_provider(&config)
        .map_err(|e| CommandError::ExecutionFailed(format!("Provider creation failed: {e}")))?;

    Ok(Orchestrator::new(provider, config))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
    })
}

fn cmd_ask(
    messages: &[String],
    model: Option<&str>,
    search: bool,
    system_prompt: &str,
    format: OutputFormat,
) -> Result<String> {
    if messages.iter().all(|m| m.trim().is_empty()) {
        return Err(CommandError::InvalidArgument("message cannot be empty".to_string()).into());
    }

    let orchestrator = build_orchestrator()?;
    let model = model.unwrap_or(orchestrator.config().default_model.as_str()).to_string();

    let rt = runtime()?;
    let response =
        rt.block_on(orchestrator.respond(&model, messages, search, system_prompt));

    Ok(format_response(&response, format))
}

/// Loads a transcript file.
fn load_transcript(path: &Path) -> Result<Vec<TranscriptMessage>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// The transcript's user messages, oldest first.
fn user_messages(transcript: &[TranscriptMessage]) -> Vec<String> {
    transcript
        .iter()
        .filter(|m| m.role() == Some(crate::agent::Role::User))
        .map(TranscriptMessage::content)
        .collect()
}

fn cmd_reconcile(
    path: &Path,
    model: Option<&str>,
    questions: &[String],
    format: OutputFormat,
) -> Result<String> {
    let transcript = load_transcript(path)?;
    let messages = if questions.is_empty() {
        user_messages(&transcript)
    } else {
        questions.to_vec()
    };
    debug!(
        path = %path.display(),
        entries = transcript.len(),
        questions = messages.len(),
        "loaded transcript"
    );

    let orchestrator = build_orchestrator()?;
    let model = model.unwrap_or(orchestrator.config().default_model.as_str()).to_string();

    let rt = runtime()?;
    let response =
        rt.block_on(orchestrator.reconcile_transcript(&model, &transcript, &messages));

    Ok(format_response(&response, format))
}

fn cmd_serve(host: &str, port: u16) -> Result<String> {
    let orchestrator = Arc::new(build_orchestrator()?);

    let rt = runtime()?;
    rt.block_on(crate::server::serve(orchestrator, host, port))
        .map_err(|e| CommandError::ExecutionFailed(format!("HTTP server error: {e}")))?;

    Ok(String::new())
}
