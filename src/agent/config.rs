//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::time::Duration;

use crate::error::AgentError;

/// Default provider name.
const DEFAULT_PROVIDER: &str = "groq";
/// Default chat model.
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
/// Models accepted by the HTTP endpoint unless overridden.
const DEFAULT_ALLOWED_MODELS: &[&str] = &["llama-3.3-70b-versatile", "llama-3.1-8b-instant"];
/// Default sampling temperature. Kept low to reduce drift.
const DEFAULT_TEMPERATURE: f32 = 0.2;
/// Default reasoning-loop step cap.
const DEFAULT_MAX_STEPS: usize = 80;
/// Default max tokens for the synthesis call.
const DEFAULT_SYNTHESIS_MAX_TOKENS: u32 = 2048;
/// Default model request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Default Tavily endpoint.
const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.tavily.com/search";
/// Default number of search results per query.
const DEFAULT_MAX_SEARCH_RESULTS: usize = 3;
/// Default Tavily search depth.
const DEFAULT_SEARCH_DEPTH: &str = "advanced";
/// Default search request timeout in seconds.
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 20;
/// Default character budget for findings passed to synthesis.
const DEFAULT_FINDINGS_CHAR_BUDGET: usize = 8000;

/// Configuration for the agent system.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (`"groq"` or `"openai"`).
    pub provider: String,
    /// API key for the model provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model used when a caller does not name one.
    pub default_model: String,
    /// Models the HTTP endpoint accepts.
    pub allowed_models: Vec<String>,
    /// Sampling temperature for every model call.
    pub temperature: f32,
    /// Step cap for the reasoning loop (model calls + tool rounds).
    pub max_steps: usize,
    /// Maximum tokens for the synthesis response.
    pub synthesis_max_tokens: u32,
    /// Model request timeout.
    pub timeout: Duration,
    /// Tavily API key. Absence disables search rather than failing.
    pub search_api_key: Option<String>,
    /// Tavily search endpoint.
    pub search_endpoint: String,
    /// Results requested per search.
    pub max_search_results: usize,
    /// Tavily `search_depth` (`"basic"` or `"advanced"`).
    pub search_depth: String,
    /// Search request timeout.
    pub search_timeout: Duration,
    /// Characters of tool findings passed to synthesis.
    pub findings_char_budget: usize,
    /// Maximum whitelisted sources.
    pub source_limit: usize,
    /// Drop synthesized references that do not cite a whitelisted URL.
    ///
    /// Off by default: the whitelist is then enforced by instruction only.
    pub strict_references: bool,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }

    /// Checks that `model` may be requested through the HTTP endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ModelNotAllowed`] if `model` is not on the allow-list.
    pub fn check_model(&self, model: &str) -> Result<(), AgentError> {
        if self.allowed_models.iter().any(|m| m == model) {
            Ok(())
        } else {
            Err(AgentError::ModelNotAllowed {
                model: model.to_string(),
            })
        }
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    default_model: Option<String>,
    allowed_models: Option<Vec<String>>,
    temperature: Option<f32>,
    max_steps: Option<usize>,
    synthesis_max_tokens: Option<u32>,
    timeout: Option<Duration>,
    search_api_key: Option<String>,
    search_endpoint: Option<String>,
    max_search_results: Option<usize>,
    search_depth: Option<String>,
    search_timeout: Option<Duration>,
    findings_char_budget: Option<usize>,
    source_limit: Option<usize>,
    strict_references: Option<bool>,
}

/// Reads a non-blank environment variable.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = env_var("GROUNDLINE_PROVIDER");
        }
        if self.api_key.is_none() {
            self.api_key = env_var("GROQ_API_KEY")
                .or_else(|| env_var("OPENAI_API_KEY"))
                .or_else(|| env_var("GROUNDLINE_API_KEY"));
        }
        if self.base_url.is_none() {
            self.base_url = env_var("GROUNDLINE_BASE_URL");
        }
        if self.default_model.is_none() {
            self.default_model = env_var("GROUNDLINE_MODEL");
        }
        if self.allowed_models.is_none() {
            self.allowed_models = env_var("GROUNDLINE_ALLOWED_MODELS").map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(String::from)
                    .collect()
            });
        }
        if self.max_steps.is_none() {
            self.max_steps = env_var("GROUNDLINE_MAX_STEPS").and_then(|v| v.parse().ok());
        }
        if self.search_api_key.is_none() {
            // TRAVILY_API_KEY is a misspelling found in older .env files.
            self.search_api_key =
                env_var("TAVILY_API_KEY").or_else(|| env_var("TRAVILY_API_KEY"));
        }
        if self.search_endpoint.is_none() {
            self.search_endpoint = env_var("TAVILY_ENDPOINT");
        }
        if self.strict_references.is_none() {
            self.strict_references = env_var("GROUNDLINE_STRICT_REFERENCES")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// Sets the model allow-list.
    #[must_use]
    pub fn allowed_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_models = Some(models.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Sets the reasoning-loop step cap.
    #[must_use]
    pub const fn max_steps(mut self, n: usize) -> Self {
        self.max_steps = Some(n);
        self
    }

    /// Sets the synthesis max tokens.
    #[must_use]
    pub const fn synthesis_max_tokens(mut self, n: u32) -> Self {
        self.synthesis_max_tokens = Some(n);
        self
    }

    /// Sets the model request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the Tavily API key.
    #[must_use]
    pub fn search_api_key(mut self, key: impl Into<String>) -> Self {
        self.search_api_key = Some(key.into());
        self
    }

    /// Sets the Tavily endpoint.
    #[must_use]
    pub fn search_endpoint(mut self, url: impl Into<String>) -> Self {
        self.search_endpoint = Some(url.into());
        self
    }

    /// Sets the number of search results per query.
    #[must_use]
    pub const fn max_search_results(mut self, n: usize) -> Self {
        self.max_search_results = Some(n);
        self
    }

    /// Sets the Tavily search depth.
    #[must_use]
    pub fn search_depth(mut self, depth: impl Into<String>) -> Self {
        self.search_depth = Some(depth.into());
        self
    }

    /// Sets the search request timeout.
    #[must_use]
    pub const fn search_timeout(mut self, duration: Duration) -> Self {
        self.search_timeout = Some(duration);
        self
    }

    /// Sets the findings character budget.
    #[must_use]
    pub const fn findings_char_budget(mut self, n: usize) -> Self {
        self.findings_char_budget = Some(n);
        self
    }

    /// Sets the source whitelist cap.
    #[must_use]
    pub const fn source_limit(mut self, n: usize) -> Self {
        self.source_limit = Some(n);
        self
    }

    /// Enables or disables mechanical reference whitelisting.
    #[must_use]
    pub const fn strict_references(mut self, on: bool) -> Self {
        self.strict_references = Some(on);
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self.api_key.ok_or(AgentError::ApiKeyMissing)?;

        Ok(AgentConfig {
            provider: self
                .provider
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            api_key,
            base_url: self.base_url,
            default_model: self
                .default_model
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            allowed_models: self.allowed_models.unwrap_or_else(|| {
                DEFAULT_ALLOWED_MODELS
                    .iter()
                    .map(|m| (*m).to_string())
                    .collect()
            }),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_steps: self.max_steps.unwrap_or(DEFAULT_MAX_STEPS),
            synthesis_max_tokens: self
                .synthesis_max_tokens
                .unwrap_or(DEFAULT_SYNTHESIS_MAX_TOKENS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            search_api_key: self.search_api_key,
            search_endpoint: self
                .search_endpoint
                .unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
            max_search_results: self
                .max_search_results
                .unwrap_or(DEFAULT_MAX_SEARCH_RESULTS),
            search_depth: self
                .search_depth
                .unwrap_or_else(|| DEFAULT_SEARCH_DEPTH.to_string()),
            search_timeout: self
                .search_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS)),
            findings_char_budget: self
                .findings_char_budget
                .unwrap_or(DEFAULT_FINDINGS_CHAR_BUDGET),
            source_limit: self
                .source_limit
                .unwrap_or(crate::core::sources::DEFAULT_SOURCE_LIMIT),
            strict_references: self.strict_references.unwrap_or(false),
        })
    }
}
