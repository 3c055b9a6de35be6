//! HTTP endpoint exposing the agent.
//!
//! `POST /chat` runs one request through the [`Orchestrator`];
//! `GET /health` reports liveness.

pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::agent::Orchestrator;

pub use routes::{ApiError, ChatBody, ChatReply};

/// Builds the router.
pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/chat", post(routes::chat))
        .route("/health", get(routes::health))
        .with_state(orchestrator)
}

/// Serves the router until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(orchestrator: Arc<Orchestrator>, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "groundline listening");

    axum::serve(listener, router(orchestrator))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
