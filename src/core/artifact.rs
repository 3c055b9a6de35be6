//! Detection of tool-call markup leaked into answer text.
//!
//! Some models emit `<function=tavily_search>{"query": ...}</function>` as
//! plain content instead of a real tool call. Such text must never be shown
//! to the user as a final answer.

use std::sync::LazyLock;

use regex::Regex;

/// Opening tag named like a tool invocation, followed by a brace-delimited blob.
static TOOLCALL_INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<\s*(?:function|tool|tavily[_-]?\w*|web[_-]?search|search)\s*[^>]*>\s*\{.*\}",
    )
    .unwrap_or_else(|_| unreachable!("static pattern"))
});

/// Returns `true` if `text` contains inline tool-call markup.
pub fn looks_like_tool_call(text: &str) -> bool {
    !text.is_empty() && TOOLCALL_INLINE_RE.is_match(text)
}
