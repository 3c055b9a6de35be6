//! Text utilities shared by the reconciliation pipeline.
//!
//! Everything here is pure and synchronous: normalization, URL/source
//! extraction, tool-call artifact detection, and the pluggable tool-output
//! cleaner.

pub mod artifact;
pub mod cleaner;
pub mod normalize;
pub mod sources;

pub use artifact::looks_like_tool_call;
pub use cleaner::{PassthroughCleaner, TextCleaner, default_cleaner};
pub use normalize::normalize;
pub use sources::{Source, extract_urls, summarize_sources};
