//! Prompts and message builders for the synthesis step.
//!
//! Two instruction sets exist: one grounds the answer in captured search
//! findings and restricts citations to the source whitelist; the other is
//! used when no findings were captured and forbids citations outright.

use super::message::{ChatMessage, system_message, user_message};

/// Describes the JSON object the synthesis model must return.
pub const FORMAT_INSTRUCTIONS: &str = r#"The output should be a markdown code snippet formatted in the following schema, including the leading and trailing "```json" and "```":

```json
{
	"answer": string  // Final answer in Markdown, no HTML.
	"bullets": list[string]  // Key points as a list of short strings.
	"references": list[string]  // List of strings; each string is 'domain — url' only from Allowed sources.
}
```"#;

/// Instructions when search findings are available.
pub const GROUNDED_INSTRUCTIONS: &str = "Return JSON ONLY in the exact format specified (no surrounding prose). \
Your JSON must have keys: answer, bullets, references. \
The 'answer' must be in Markdown, no HTML. \
Ground the answer strictly in the provided 'Search findings'. \
Cite ONLY from 'Allowed sources'; if you cite, each entry must be 'domain — url' from that list. \
If the findings are insufficient, say so in 'answer'.";

/// Instructions when no findings were captured.
pub const GENERAL_KNOWLEDGE_INSTRUCTIONS: &str = "Return JSON ONLY in the exact format specified (no surrounding prose). \
Your JSON must have keys: answer, bullets, references. \
The 'answer' must be in Markdown, no HTML. \
The web-search findings were not available; answer based on general knowledge. \
Do NOT fabricate citations; leave 'references' empty.";

/// Returned when synthesis fails and no usable draft exists.
pub const APOLOGY: &str =
    "I couldn’t complete the web-search step just now, so I answered from general knowledge.";

/// Inputs for one synthesis prompt.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisContext<'a> {
    /// The most recent user message.
    pub question: &'a str,
    /// Pre-rendered whitelist (see [`crate::core::sources::format_sources`]).
    pub sources: &'a str,
    /// Budget-truncated findings text; empty when nothing was captured.
    pub findings: &'a str,
    /// The agent's clean final text, if any.
    pub draft: &'a str,
}

impl SynthesisContext<'_> {
    /// Returns `true` when the grounded instruction set applies.
    pub const fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}

/// Builds the synthesis conversation.
pub fn build_synthesis_messages(ctx: &SynthesisContext<'_>) -> Vec<ChatMessage> {
    let draft = if ctx.draft.is_empty() {
        "(none)"
    } else {
        ctx.draft
    };

    if ctx.has_findings() {
        vec![
            system_message(&format!("{GROUNDED_INSTRUCTIONS}\n\n{FORMAT_INSTRUCTIONS}")),
            user_message(&format!("User question:\n{}", ctx.question)),
            user_message(&format!(
                "Allowed sources (use ONLY these if you cite):\n{}",
                ctx.sources
            )),
            user_message(&format!(
                "Search findings (clean excerpts):\n{}",
                ctx.findings
            )),
            user_message(&format!("Agent draft (if any):\n{draft}")),
        ]
    } else {
        vec![
            system_message(&format!(
                "{GENERAL_KNOWLEDGE_INSTRUCTIONS}\n\n{FORMAT_INSTRUCTIONS}"
            )),
            user_message(&format!("User question:\n{}", ctx.question)),
            user_message(
                "Context:\nNo verified search findings were available due to missing tool results.",
            ),
            user_message(&format!("Agent draft (if any):\n{draft}")),
        ]
    }
}

/// Builds the single-message prompt for the fix-up pass.
pub fn build_fix_prompt(completion: &str, error: &str) -> String {
    format!(
        "Instructions:\n--------------\n{FORMAT_INSTRUCTIONS}\n--------------\n\
         Completion:\n--------------\n{completion}\n--------------\n\n\
         Above, the Completion did not satisfy the constraints given in the Instructions.\n\
         Error:\n--------------\n{error}\n--------------\n\n\
         Please try again. Please only respond with an answer that satisfies the \
         constraints laid out in the Instructions:"
    )
}
