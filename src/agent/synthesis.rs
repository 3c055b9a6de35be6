//! Structured synthesis of a final answer.
//!
//! The model is asked for a JSON object with `answer`, `bullets`, and
//! `references`. A malformed reply gets one fix-up pass: the bad completion
//! and the parse error are sent back to the same model with a request to
//! restate it in the required shape.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::message::{ChatRequest, user_message};
use super::prompt::{SynthesisContext, build_fix_prompt, build_synthesis_messages};
use super::provider::LlmProvider;
use crate::core::normalize;
use crate::core::sources::{Source, cites_whitelisted};
use crate::error::AgentError;

/// Keys the structured reply must contain.
const REQUIRED_KEYS: [&str; 3] = ["answer", "bullets", "references"];

/// Outermost fenced block, optionally tagged `json`. Greedy, so fences
/// nested inside JSON strings stay in the payload.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(.*)```").unwrap_or_else(|_| unreachable!("static pattern"))
});

/// The structured reply from the synthesis model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisResult {
    /// Final answer in Markdown.
    pub answer: String,
    /// Short key points.
    pub bullets: Vec<String>,
    /// Citations, each expected to be `domain — url` from the whitelist.
    pub references: Vec<String>,
}

impl SynthesisResult {
    /// Parses a model reply.
    ///
    /// Accepts a fenced ```json block or a bare JSON object. All three keys
    /// must be present. Non-list `bullets`/`references` are treated as
    /// empty; non-string items are stringified.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ResponseParse`] if no JSON object can be read
    /// or a required key is missing.
    pub fn parse(content: &str) -> Result<Self, AgentError> {
        let value = extract_json(content).map_err(|e| AgentError::ResponseParse {
            message: format!("invalid JSON: {e}"),
            content: content.to_string(),
        })?;

        let Value::Object(obj) = value else {
            return Err(AgentError::ResponseParse {
                message: "expected a JSON object".to_string(),
                content: content.to_string(),
            });
        };

        if let Some(missing) = REQUIRED_KEYS.iter().find(|k| !obj.contains_key(**k)) {
            return Err(AgentError::ResponseParse {
                message: format!("Got invalid return object. Expected key `{missing}` to be present"),
                content: content.to_string(),
            });
        }

        Ok(Self {
            answer: text_of(obj.get("answer")),
            bullets: list_of(&obj, "bullets"),
            references: list_of(&obj, "references"),
        })
    }

    /// Drops references that do not cite a whitelisted URL.
    ///
    /// Returns the number of references removed.
    pub fn retain_whitelisted(&mut self, sources: &[Source]) -> usize {
        let before = self.references.len();
        self.references.retain(|r| cites_whitelisted(r, sources));
        before - self.references.len()
    }

    /// Renders the final Markdown answer.
    ///
    /// The normalized answer comes first, followed by a **Key points**
    /// section and a **References** section when they have non-blank
    /// entries. The result is trimmed.
    pub fn compose(&self) -> String {
        let mut out = normalize(&self.answer);
        append_section(&mut out, "Key points", &self.bullets);
        append_section(&mut out, "References", &self.references);
        out.trim().to_string()
    }
}

fn append_section(out: &mut String, title: &str, items: &[String]) {
    let lines: Vec<String> = items
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .map(|i| format!("- {i}"))
        .collect();
    if lines.is_empty() {
        return;
    }
    out.push_str("\n\n**");
    out.push_str(title);
    out.push_str("**\n");
    out.push_str(&lines.join("\n"));
}

/// Reads the JSON payload of a model reply.
///
/// The span from the first `{` to the last `}` is tried first, then the
/// outermost fenced block, then the whole trimmed reply.
fn extract_json(content: &str) -> Result<Value, serde_json::Error> {
    let trimmed = content.trim();
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && start < end
        && let Ok(value) = serde_json::from_str(&trimmed[start..=end])
    {
        return Ok(value);
    }
    let payload = FENCE_RE
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map_or(trimmed, |m| m.as_str());
    serde_json::from_str(payload)
}

fn text_of(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn list_of(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items.iter().map(|i| text_of(Some(i))).collect(),
        _ => Vec::new(),
    }
}

/// Runs the synthesis call and its fix-up pass against one model.
pub struct Synthesizer<'a> {
    provider: &'a dyn LlmProvider,
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
}

impl<'a> Synthesizer<'a> {
    /// Creates a synthesizer bound to a provider and model.
    #[must_use]
    pub const fn new(
        provider: &'a dyn LlmProvider,
        model: &'a str,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            model,
            temperature,
            max_tokens,
        }
    }

    fn request(&self, messages: Vec<super::message::ChatMessage>) -> ChatRequest {
        ChatRequest {
            model: self.model.to_string(),
            messages,
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            tools: Vec::new(),
        }
    }

    /// Asks the model for a structured answer.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if either model call fails or the reply is
    /// still malformed after the fix-up pass.
    pub async fn synthesize(
        &self,
        ctx: &SynthesisContext<'_>,
    ) -> Result<SynthesisResult, AgentError> {
        let request = self.request(build_synthesis_messages(ctx));
        let response = self.provider.chat(&request).await?;
        debug!(
            grounded = ctx.has_findings(),
            tokens = response.usage.total_tokens,
            "synthesis response received"
        );
        self.parse_with_fix(&response.content).await
    }

    /// Parses `content`, falling back to one model-assisted repair.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if the repair call fails or its output is also malformed.
    pub async fn parse_with_fix(&self, content: &str) -> Result<SynthesisResult, AgentError> {
        let err = match SynthesisResult::parse(content) {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        warn!(error = %err, "synthesis output malformed, attempting fix-up pass");
        let request = self.request(vec![user_message(&build_fix_prompt(
            content,
            &err.to_string(),
        ))]);
        let response = self.provider.chat(&request).await?;
        SynthesisResult::parse(&response.content)
    }
}
