//! Tavily web search tool.
//!
//! Configured for concise output: a small number of results, Tavily's own
//! answer summary, and no raw page content.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::config::AgentConfig;
use super::tool::{Tool, ToolDefinition};
use crate::error::AgentError;

/// Name the model uses to call the search tool.
pub const SEARCH_TOOL_NAME: &str = "tavily_search";

/// Hard ceiling on results per query regardless of configuration.
const MAX_RESULTS_CAP: usize = 20;
/// Maximum query length accepted from the model.
const MAX_QUERY_LEN: usize = 400;

/// Web search backed by the Tavily API.
#[derive(Debug, Clone)]
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    max_results: usize,
    search_depth: String,
    timeout: Duration,
}

impl TavilySearch {
    /// Builds the tool from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ToolUnavailable`] if no Tavily key is configured.
    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let api_key = config
            .search_api_key
            .clone()
            .ok_or_else(|| AgentError::ToolUnavailable {
                name: SEARCH_TOOL_NAME.to_string(),
                reason: "missing TAVILY_API_KEY".to_string(),
            })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: config.search_endpoint.clone(),
            max_results: config.max_search_results.clamp(1, MAX_RESULTS_CAP),
            search_depth: config.search_depth.clone(),
            timeout: config.search_timeout,
        })
    }

    /// Builds the request body for a query.
    fn request_body(&self, query: &str) -> serde_json::Value {
        json!({
            "query": query,
            "max_results": self.max_results,
            "search_depth": self.search_depth,
            "include_answer": true,
            "include_raw_content": false,
        })
    }

    /// Runs a search and returns the parsed response.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiRequest`] on transport or HTTP failures.
    pub async fn search(&self, query: &str) -> Result<SearchOutput, AgentError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
            .json(&self.request_body(query))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AgentError::ApiRequest {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AgentError::ApiRequest {
                message: format!("tavily search HTTP {status}"),
                status: Some(status.as_u16()),
            });
        }

        let mut parsed: SearchOutput = resp.json().await.map_err(|e| AgentError::ApiRequest {
            message: format!("invalid tavily response: {e}"),
            status: None,
        })?;
        parsed.results.truncate(self.max_results);
        if parsed.query.is_empty() {
            parsed.query = query.to_string();
        }

        debug!(
            query,
            results = parsed.results.len(),
            has_answer = parsed.answer.is_some(),
            "tavily search complete"
        );
        Ok(parsed)
    }
}

/// A single search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page title.
    #[serde(default)]
    pub title: String,
    /// Page URL.
    pub url: String,
    /// Relevant excerpt.
    #[serde(default)]
    pub content: String,
    /// Provider relevance score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Search output as handed back to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutput {
    /// The query that was run.
    #[serde(default)]
    pub query: String,
    /// Provider-written summary answer, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Result list.
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
}

/// Parses and validates tool arguments.
fn parse_query(arguments: &str) -> Result<String, AgentError> {
    let args: SearchArgs = serde_json::from_str(arguments).map_err(|e| AgentError::ToolExecution {
        name: SEARCH_TOOL_NAME.to_string(),
        message: format!("invalid arguments: {e}"),
    })?;
    let query = args.query.trim();
    if query.is_empty() {
        return Err(AgentError::ToolExecution {
            name: SEARCH_TOOL_NAME.to_string(),
            message: "query must not be empty".to_string(),
        });
    }
    Ok(query.chars().take(MAX_QUERY_LEN).collect())
}

#[async_trait]
impl Tool for TavilySearch {
    fn name(&self) -> &str {
        SEARCH_TOOL_NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: SEARCH_TOOL_NAME.to_string(),
            description: "Search the web for current information. Returns a short answer \
                           summary and a few results with title, url, and excerpt."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query."
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        }
    }

    async fn call(&self, arguments: &str) -> Result<String, AgentError> {
        let query = parse_query(arguments)?;
        let output = self
            .search(&query)
            .await
            .map_err(|e| AgentError::ToolExecution {
                name: SEARCH_TOOL_NAME.to_string(),
                message: e.to_string(),
            })?;
        serde_json::to_string(&output).map_err(|e| AgentError::ToolExecution {
            name: SEARCH_TOOL_NAME.to_string(),
            message: format!("failed to encode results: {e}"),
        })
    }
}
