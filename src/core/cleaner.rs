//! Optional cleanup of tool output before synthesis.
//!
//! The strategy is picked once when the reconciler is built. With the
//! `html-cleanup` feature, HTML in search results is rendered to plain text;
//! without it, text passes through unchanged.

/// Converts tool output into plain text suitable for a synthesis prompt.
pub trait TextCleaner: Send + Sync {
    /// Cleaner name for logging.
    fn name(&self) -> &'static str;

    /// Returns a cleaned version of `text`. Must never fail; on trouble,
    /// return the input unchanged.
    fn clean(&self, text: &str) -> String;
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCleaner;

impl TextCleaner for PassthroughCleaner {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn clean(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Renders HTML to plain text with `html2text`.
#[cfg(feature = "html-cleanup")]
#[derive(Debug, Clone, Copy)]
pub struct HtmlToTextCleaner {
    width: usize,
}

#[cfg(feature = "html-cleanup")]
impl HtmlToTextCleaner {
    /// Wide enough that html2text never re-wraps prose lines.
    const DEFAULT_WIDTH: usize = 10_000;

    /// Creates a cleaner with the default (no-wrap) width.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
        }
    }
}

#[cfg(feature = "html-cleanup")]
impl Default for HtmlToTextCleaner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "html-cleanup")]
impl TextCleaner for HtmlToTextCleaner {
    fn name(&self) -> &'static str {
        "html2text"
    }

    fn clean(&self, text: &str) -> String {
        html2text::from_read(std::io::Cursor::new(text.as_bytes()), self.width)
            .unwrap_or_else(|_| text.to_string())
    }
}

/// Returns the best cleaner compiled into this build.
pub fn default_cleaner() -> Box<dyn TextCleaner> {
    #[cfg(feature = "html-cleanup")]
    {
        Box::new(HtmlToTextCleaner::new())
    }
    #[cfg(not(feature = "html-cleanup"))]
    {
        Box::new(PassthroughCleaner)
    }
}
