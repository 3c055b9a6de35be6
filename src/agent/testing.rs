//! Scripted providers and tools for offline tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use super::message::{ChatRequest, ChatResponse, TokenUsage};
use super::provider::LlmProvider;
use super::tool::{Tool, ToolCall, ToolDefinition};
use crate::error::AgentError;

/// Provider that replays a fixed script of responses, then fails.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ChatResponse, AgentError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<ChatResponse, AgentError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A provider whose every call fails.
    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.unwrap_or_else(|| {
            Err(AgentError::ApiRequest {
                message: "script exhausted".to_string(),
                status: Some(503),
            })
        })
    }
}

/// A plain text model reply.
pub fn text(content: &str) -> Result<ChatResponse, AgentError> {
    Ok(ChatResponse {
        content: content.to_string(),
        usage: TokenUsage::default(),
        tool_calls: Vec::new(),
    })
}

/// A model reply requesting one tool call.
pub fn tool_call(id: &str, name: &str, arguments: &str) -> Result<ChatResponse, AgentError> {
    Ok(ChatResponse {
        content: String::new(),
        usage: TokenUsage::default(),
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }],
    })
}

/// A model call that errors.
pub fn api_error() -> Result<ChatResponse, AgentError> {
    Err(AgentError::ApiRequest {
        message: "boom".to_string(),
        status: Some(500),
    })
}

fn query_definition(name: &str) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: "test tool".to_string(),
        parameters: json!({"type": "object", "properties": {"query": {"type": "string"}}}),
    }
}

/// Tool that always returns the same output.
pub struct StaticTool {
    name: String,
    output: String,
}

impl StaticTool {
    pub fn new(name: &str, output: &str) -> Self {
        Self {
            name: name.to_string(),
            output: output.to_string(),
        }
    }
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn definition(&self) -> ToolDefinition {
        query_definition(&self.name)
    }

    async fn call(&self, _arguments: &str) -> Result<String, AgentError> {
        Ok(self.output.clone())
    }
}

/// Tool that always fails.
pub struct FailingTool {
    name: String,
}

impl FailingTool {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn definition(&self) -> ToolDefinition {
        query_definition(&self.name)
    }

    async fn call(&self, _arguments: &str) -> Result<String, AgentError> {
        Err(AgentError::ToolExecution {
            name: self.name.clone(),
            message: "backend unavailable".to_string(),
        })
    }
}
