//! URL extraction and source whitelisting.
//!
//! Search-tool output is scanned for URLs; the first few distinct
//! `(domain, url)` pairs become the only sources the synthesis step may cite.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default cap on whitelisted sources.
pub const DEFAULT_SOURCE_LIMIT: usize = 5;

/// `http`/`https` URL, terminated by whitespace, closing brackets, angle brackets, or quotes.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s\])}<>"']+"#).unwrap_or_else(|_| unreachable!("static pattern"))
});

/// A whitelisted citation source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    /// Lower-cased host with any leading `www.` removed.
    pub domain: String,
    /// The URL exactly as it appeared in the tool output.
    pub url: String,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {}", self.domain, self.url)
    }
}

/// Finds every URL-looking substring in `text`, in order of appearance.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Returns the domain used for a URL, or `None` if it has no parseable host.
pub fn source_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let domain = host.strip_prefix("www.").unwrap_or(&host);
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_string())
    }
}

/// Picks up to `limit` distinct sources from `urls`, in first-seen order.
///
/// Uniqueness is by the `(domain, url)` pair, so two different pages on the
/// same site are both kept. URLs whose host cannot be parsed are skipped.
pub fn summarize_sources<S: AsRef<str>>(urls: &[S], limit: usize) -> Vec<Source> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut picked = Vec::new();

    for url in urls {
        if picked.len() >= limit {
            break;
        }
        let url = url.as_ref();
        let Some(domain) = source_domain(url) else {
            continue;
        };
        if seen.insert((domain.clone(), url.to_string())) {
            picked.push(Source {
                domain,
                url: url.to_string(),
            });
        }
    }

    picked
}

/// Renders the whitelist as the bullet list shown to the synthesis model.
pub fn format_sources(sources: &[Source]) -> String {
    if sources.is_empty() {
        return "(no URLs captured)".to_string();
    }
    sources
        .iter()
        .map(|s| format!("- {s}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns `true` if `reference` cites one of the whitelisted URLs.
pub fn cites_whitelisted(reference: &str, sources: &[Source]) -> bool {
    sources.iter().any(|s| reference.contains(&s.url))
}
