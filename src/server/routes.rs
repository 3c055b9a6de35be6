//! Request handlers and wire types.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::agent::Orchestrator;
use crate::error::AgentError;

/// Body of `POST /chat`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatBody {
    /// Model identifier; must be on the allow-list.
    pub model_name: String,
    /// User messages, oldest first.
    pub messages: Vec<String>,
    /// Whether the search tool may be used.
    #[serde(default)]
    pub allow_search: bool,
    /// System instructions; empty for none.
    #[serde(default)]
    pub system_prompt: String,
}

/// Reply of `POST /chat`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatReply {
    /// The final answer.
    pub response: String,
}

/// Errors surfaced to HTTP clients.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The requested model is not on the allow-list.
    #[error("Invalid model name. Kindly select a valid AI model")]
    InvalidModel(#[source] AgentError),
}

impl From<AgentError> for ApiError {
    fn from(e: AgentError) -> Self {
        Self::InvalidModel(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::InvalidModel(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// `POST /chat`
pub async fn chat(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, ApiError> {
    if let Err(e) = orchestrator.config().check_model(&body.model_name) {
        warn!(error = %e, "rejected chat request");
        return Err(e.into());
    }

    info!(
        model = %body.model_name,
        messages = body.messages.len(),
        allow_search = body.allow_search,
        "chat request"
    );
    let response = orchestrator
        .respond(
            &body.model_name,
            &body.messages,
            body.allow_search,
            &body.system_prompt,
        )
        .await;

    Ok(Json(ChatReply { response }))
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
