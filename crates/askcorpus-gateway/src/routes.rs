//! API route handlers for the gateway.

use askcorpus_core::error::AskCorpusError;
use axum::http::StatusCode;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::answer;
use super::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// Map an internal error category to a transport status. This is the
/// only place internal error kinds become responses.
fn error_status(err: &AskCorpusError) -> StatusCode {
    match err {
        AskCorpusError::UpstreamCompletion(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_body(status: StatusCode, detail: String) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({ "detail": detail })))
}

/// `POST /chat` — answer a question over the indexed corpus.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<serde_json::Value>)> {
    let question = req.query.trim();
    if question.is_empty() {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            "query must be a non-empty string".into(),
        ));
    }

    match answer::answer(
        &state.store,
        state.embeddings.as_ref(),
        state.llm.as_ref(),
        question,
        state.config.retrieval.top_k,
    )
    .await
    {
        Ok(text) => Ok(Json(ChatResponse { answer: text })),
        Err(e) => {
            tracing::error!("chat request failed: {e}");
            Err(error_body(error_status(&e), e.to_string()))
        }
    }
}

/// `GET /health` — liveness check.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "askcorpus-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
