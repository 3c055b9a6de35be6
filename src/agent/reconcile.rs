//! Reconciliation stage: turns a reasoning transcript into one clean answer.
//!
//! If the loop produced a clean final answer without touching tools, that
//! answer is returned as-is. Otherwise the tool findings are cleaned, their
//! URLs are whitelisted, and the model is asked for a structured answer
//! grounded in the findings. Every failure degrades to the best text we
//! have; the caller always receives a string.

use tracing::{debug, info, warn};

use super::config::AgentConfig;
use super::prompt::{APOLOGY, SynthesisContext};
use super::provider::LlmProvider;
use super::synthesis::Synthesizer;
use super::transcript::TranscriptMessage;
use crate::core::sources::format_sources;
use crate::core::{TextCleaner, extract_urls, looks_like_tool_call, normalize, summarize_sources};

/// The most recent clean model answer in a transcript.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FinalText {
    /// Normalized text of the answer, empty if none was found.
    pub text: String,
    /// Whether a later model message was skipped because it looked like a
    /// leaked tool call.
    pub saw_artifact: bool,
}

/// Scans the transcript backwards for the latest clean model answer.
///
/// Model messages that requested a tool call are skipped. Messages whose
/// normalized content looks like a leaked tool call are remembered and
/// skipped.
pub fn find_final_text(transcript: &[TranscriptMessage]) -> FinalText {
    let mut found = FinalText::default();
    for msg in transcript.iter().rev() {
        if !msg.is_assistant() || msg.requested_tool_call() {
            continue;
        }
        let candidate = normalize(&msg.content());
        if candidate.is_empty() {
            continue;
        }
        if looks_like_tool_call(&candidate) {
            found.saw_artifact = true;
            continue;
        }
        found.text = candidate;
        break;
    }
    found
}

/// Truncates `text` to at most `budget` characters.
fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Reconciles transcripts against one provider and configuration.
pub struct Reconciler<'a> {
    provider: &'a dyn LlmProvider,
    config: &'a AgentConfig,
    cleaner: &'a dyn TextCleaner,
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler.
    #[must_use]
    pub const fn new(
        provider: &'a dyn LlmProvider,
        config: &'a AgentConfig,
        cleaner: &'a dyn TextCleaner,
    ) -> Self {
        Self {
            provider,
            config,
            cleaner,
        }
    }

    /// Produces the final answer for a transcript.
    ///
    /// `messages` are the caller's original user messages; the last one is
    /// treated as the question.
    pub async fn reconcile(
        &self,
        model: &str,
        transcript: &[TranscriptMessage],
        messages: &[String],
    ) -> String {
        let raw_chunks: Vec<String> = transcript
            .iter()
            .filter(|m| m.is_tool())
            .map(TranscriptMessage::content)
            .collect();
        let used_tools = !raw_chunks.is_empty();
        let final_text = find_final_text(transcript);

        if !used_tools && !final_text.text.is_empty() {
            debug!("fast path: clean final answer without tool use");
            return final_text.text;
        }

        let chunks: Vec<String> = raw_chunks
            .iter()
            .map(|raw| normalize(&self.cleaner.clean(&normalize(raw))))
            .collect();

        let urls: Vec<String> = chunks.iter().flat_map(|c| extract_urls(c)).collect();
        let sources = summarize_sources(&urls, self.config.source_limit);
        let sources_text = format_sources(&sources);

        let joined = chunks
            .iter()
            .filter(|c| !c.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n");
        let findings = truncate_chars(&joined, self.config.findings_char_budget);

        info!(
            used_tools,
            chunks = chunks.len(),
            sources = sources.len(),
            findings_chars = findings.chars().count(),
            saw_artifact = final_text.saw_artifact,
            cleaner = self.cleaner.name(),
            "synthesizing grounded answer"
        );

        let ctx = SynthesisContext {
            question: messages.last().map_or("", String::as_str),
            sources: &sources_text,
            findings,
            draft: &final_text.text,
        };
        let synthesizer = Synthesizer::new(
            self.provider,
            model,
            self.config.temperature,
            self.config.synthesis_max_tokens,
        );

        match synthesizer.synthesize(&ctx).await {
            Ok(mut result) => {
                if self.config.strict_references {
                    let dropped = result.retain_whitelisted(&sources);
                    if dropped > 0 {
                        warn!(dropped, "dropped references outside the source whitelist");
                    }
                }
                let composed = result.compose();
                if composed.is_empty() {
                    fallback(final_text.text)
                } else {
                    composed
                }
            }
            Err(e) => {
                warn!(error = %e, "structured synthesis failed");
                fallback(final_text.text)
            }
        }
    }
}

/// The clean draft, or the apology when there is none. The answer is never empty.
fn fallback(final_text: String) -> String {
    if final_text.is_empty() {
        APOLOGY.to_string()
    } else {
        final_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::{assistant_message, system_message, tool_message, user_message};
    use crate::agent::testing::{ScriptedProvider, api_error, text};
    use crate::agent::tool::ToolCall;
    use crate::core::PassthroughCleaner;
    use serde_json::json;

    const REUTERS_REF: &str = "reuters.com — https://www.reuters.com/world/a1";

    fn config(strict: bool) -> AgentConfig {
        AgentConfig::builder()
            .api_key("test")
            .strict_references(strict)
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    fn search_call() -> TranscriptMessage {
        assistant_message(
            "",
            vec![ToolCall {
                id: "c1".to_string(),
                name: "tavily_search".to_string(),
                arguments: r#"{"query":"news"}"#.to_string(),
            }],
        )
        .into()
    }

    fn question() -> Vec<String> {
        vec!["What happened?".to_string()]
    }

    fn tool_transcript(tool_output: &str) -> Vec<TranscriptMessage> {
        vec![
            system_message("sys").into(),
            user_message("What happened?").into(),
            search_call(),
            tool_message("c1", tool_output).into(),
        ]
    }

    #[test]
    fn test_find_final_text_skips_artifacts() {
        let transcript: Vec<TranscriptMessage> = vec![
            assistant_message("A clean earlier answer.", Vec::new()).into(),
            assistant_message(r#"<function=tavily_search>{"query": "x"}</function>"#, Vec::new())
                .into(),
        ];
        let found = find_final_text(&transcript);
        assert_eq!(found.text, "A clean earlier answer.");
        assert!(found.saw_artifact);
    }

    #[test]
    fn test_find_final_text_skips_tool_requests_and_blank() {
        let transcript: Vec<TranscriptMessage> = vec![
            search_call(),
            assistant_message("  <br>  ", Vec::new()).into(),
        ];
        assert_eq!(find_final_text(&transcript), FinalText::default());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[tokio::test]
    async fn test_fast_path_makes_no_calls() {
        let provider = ScriptedProvider::failing();
        let config = config(false);
        let reconciler = Reconciler::new(&provider, &config, &PassthroughCleaner);
        let transcript: Vec<TranscriptMessage> = vec![
            user_message("Capital of France?").into(),
            assistant_message("Paris is the capital of France.  \n", Vec::new()).into(),
        ];

        let out = reconciler
            .reconcile("m", &transcript, &["Capital of France?".to_string()])
            .await;
        assert_eq!(out, "Paris is the capital of France.");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_synthesis_with_whitelisted_reference() {
        let reply = format!(
            "```json\n{}\n```",
            json!({
                "answer": "Something happened.",
                "bullets": ["It happened today."],
                "references": [REUTERS_REF],
            })
        );
        let provider = ScriptedProvider::new(vec![text(&reply)]);
        let config = config(false);
        let reconciler = Reconciler::new(&provider, &config, &PassthroughCleaner);
        let transcript = tool_transcript("...see https://www.reuters.com/world/a1 for details...");

        let out = reconciler.reconcile("m", &transcript, &question()).await;
        assert_eq!(
            out,
            format!(
                "Something happened.\n\n**Key points**\n- It happened today.\n\n**References**\n- {REUTERS_REF}"
            )
        );

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let msgs = &requests[0].messages;
        assert_eq!(msgs.len(), 5);
        assert!(msgs[1].content.ends_with("What happened?"));
        assert!(msgs[2].content.contains(REUTERS_REF));
        assert!(msgs[3].content.contains("see https://www.reuters.com/world/a1"));
        assert!(msgs[4].content.ends_with("(none)"));
        assert!(requests[0].tools.is_empty());
    }

    #[tokio::test]
    async fn test_synthesis_without_references_has_no_section() {
        let reply = r#"{"answer": "Quiet day.", "bullets": [], "references": []}"#;
        let provider = ScriptedProvider::new(vec![text(reply)]);
        let config = config(false);
        let reconciler = Reconciler::new(&provider, &config, &PassthroughCleaner);
        let transcript = tool_transcript("see https://www.reuters.com/world/a1");

        let out = reconciler.reconcile("m", &transcript, &question()).await;
        assert_eq!(out, "Quiet day.");
        assert!(!out.contains("**References**"));
    }

    #[tokio::test]
    async fn test_no_findings_uses_general_instructions() {
        let reply = r#"{"answer": "From general knowledge.", "bullets": [], "references": []}"#;
        let provider = ScriptedProvider::new(vec![text(reply)]);
        let config = config(false);
        let reconciler = Reconciler::new(&provider, &config, &PassthroughCleaner);
        let transcript = tool_transcript("  <br> \r\n ");

        let out = reconciler.reconcile("m", &transcript, &question()).await;
        assert_eq!(out, "From general knowledge.");

        let requests = provider.requests();
        let msgs = &requests[0].messages;
        assert_eq!(msgs.len(), 4);
        assert!(msgs[0].content.contains("leave 'references' empty"));
        assert!(msgs[1].content.ends_with("What happened?"));
    }

    #[tokio::test]
    async fn test_artifact_only_transcript_synthesizes() {
        let reply = r#"{"answer": "Recovered.", "bullets": [], "references": []}"#;
        let provider = ScriptedProvider::new(vec![text(reply)]);
        let config = config(false);
        let reconciler = Reconciler::new(&provider, &config, &PassthroughCleaner);
        let transcript: Vec<TranscriptMessage> = vec![
            user_message("q").into(),
            assistant_message(r#"<tool>{"name": "tavily_search"}</tool>"#, Vec::new()).into(),
        ];

        let out = reconciler
            .reconcile("m", &transcript, &["q".to_string()])
            .await;
        assert_eq!(out, "Recovered.");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_total_failure_returns_apology() {
        let provider = ScriptedProvider::new(vec![api_error(), api_error()]);
        let config = config(false);
        let reconciler = Reconciler::new(&provider, &config, &PassthroughCleaner);
        let transcript = tool_transcript("see https://example.com/a");

        let out = reconciler.reconcile("m", &transcript, &question()).await;
        assert_eq!(out, APOLOGY);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_clean_draft() {
        let provider = ScriptedProvider::failing();
        let config = config(false);
        let reconciler = Reconciler::new(&provider, &config, &PassthroughCleaner);
        let mut transcript = tool_transcript("see https://example.com/a");
        transcript.push(assistant_message("Draft answer.", Vec::new()).into());

        let out = reconciler.reconcile("m", &transcript, &question()).await;
        assert_eq!(out, "Draft answer.");
    }

    #[tokio::test]
    async fn test_empty_composition_falls_back_to_draft() {
        let reply = r#"{"answer": "", "bullets": [" "], "references": []}"#;
        let provider = ScriptedProvider::new(vec![text(reply)]);
        let config = config(false);
        let reconciler = Reconciler::new(&provider, &config, &PassthroughCleaner);
        let mut transcript = tool_transcript("see https://example.com/a");
        transcript.push(assistant_message("Draft answer.", Vec::new()).into());

        let out = reconciler.reconcile("m", &transcript, &question()).await;
        assert_eq!(out, "Draft answer.");
    }

    #[tokio::test]
    async fn test_empty_composition_without_draft_returns_apology() {
        let reply = r#"{"answer": "  ", "bullets": [], "references": [""]}"#;
        let provider = ScriptedProvider::new(vec![text(reply)]);
        let config = config(false);
        let reconciler = Reconciler::new(&provider, &config, &PassthroughCleaner);
        let transcript = tool_transcript("see https://example.com/a");

        let out = reconciler.reconcile("m", &transcript, &question()).await;
        assert_eq!(out, APOLOGY);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fix_up_pass_recovers() {
        let provider = ScriptedProvider::new(vec![
            text("Not JSON at all."),
            text(r#"{"answer": "Fixed.", "bullets": [], "references": []}"#),
        ]);
        let config = config(false);
        let reconciler = Reconciler::new(&provider, &config, &PassthroughCleaner);
        let transcript = tool_transcript("see https://example.com/a");

        let out = reconciler.reconcile("m", &transcript, &question()).await;
        assert_eq!(out, "Fixed.");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_strict_references_drops_fabrications() {
        let reply = json!({
            "answer": "A.",
            "bullets": [],
            "references": [REUTERS_REF, "fake.com — https://fake.com/made-up"],
        })
        .to_string();

        for (strict, expected_refs) in [(true, 1), (false, 2)] {
            let provider = ScriptedProvider::new(vec![text(&reply)]);
            let config = config(strict);
            let reconciler = Reconciler::new(&provider, &config, &PassthroughCleaner);
            let transcript = tool_transcript("see https://www.reuters.com/world/a1");

            let out = reconciler.reconcile("m", &transcript, &question()).await;
            let refs = out
                .split("**References**\n")
                .nth(1)
                .map_or(0, |s| s.lines().count());
            assert_eq!(refs, expected_refs, "strict = {strict}");
        }
    }

    #[tokio::test]
    async fn test_findings_budget_and_source_cap() {
        let provider = ScriptedProvider::new(vec![text(
            r#"{"answer": "ok", "bullets": [], "references": []}"#,
        )]);
        let config = AgentConfig::builder()
            .api_key("test")
            .findings_char_budget(40)
            .source_limit(2)
            .build()
            .unwrap_or_else(|_| unreachable!());
        let reconciler = Reconciler::new(&provider, &config, &PassthroughCleaner);
        let output = (0..4)
            .map(|i| format!("https://site{i}.com/page"))
            .collect::<Vec<_>>()
            .join(" ");
        let transcript = tool_transcript(&output);

        let _ = reconciler.reconcile("m", &transcript, &question()).await;
        let requests = provider.requests();
        let msgs = &requests[0].messages;
        assert_eq!(msgs[2].content.lines().count(), 3);
        let findings = msgs[3]
            .content
            .trim_start_matches("Search findings (clean excerpts):\n");
        assert_eq!(findings.chars().count(), 40);
    }

    #[tokio::test]
    async fn test_record_transcript() {
        let provider = ScriptedProvider::failing();
        let config = config(false);
        let reconciler = Reconciler::new(&provider, &config, &PassthroughCleaner);
        let transcript: Vec<TranscriptMessage> = serde_json::from_value(json!([
            {"type": "human", "content": "q"},
            {"type": "ai", "content": [{"type": "text", "text": "Answer from record."}]}
        ]))
        .unwrap_or_else(|e| unreachable!("{e}"));

        let out = reconciler
            .reconcile("m", &transcript, &["q".to_string()])
            .await;
        assert_eq!(out, "Answer from record.");
        assert_eq!(provider.call_count(), 0);
    }
}
