//! Chat endpoint - the relay's one request path with real work in it.
//!
//! Flow: append user turn -> snapshot window -> system prompt + window to the
//! completion gateway -> append assistant turn on success. Any failure is
//! answered with the fallback reply; the user turn is not rolled back.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::ChatError;
use crate::gateway::CompletionRequest;
use crate::memory::{Message, Role};
use crate::metrics;
use crate::prompts::{FALLBACK_MESSAGE, SYSTEM_PROMPT};
use crate::shared_state::AppState;

/// Request body matching what the frontend sends
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default = "default_session_id")]
    #[validate(length(min = 1, max = 128))]
    pub session_id: String,
    #[validate(length(min = 1, max = 4000))]
    pub message: String,
}

fn default_session_id() -> String {
    "default".to_string()
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ClearedResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Runs one chat turn against the gateway.
///
/// Missing credentials short-circuit before anything is buffered. Every other
/// failure leaves the user turn in the window with no paired reply.
pub async fn relay_turn(
    state: &AppState,
    session_id: &str,
    message: &str,
) -> Result<String, ChatError> {
    let gateway = state.gateway.as_ref().ok_or(ChatError::MissingCredentials)?;

    state.memory.add(session_id, Role::User, message);
    let history = state.memory.get_recent(session_id);

    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(Message::system(SYSTEM_PROMPT));
    messages.extend(history);

    let timeout = state.config.request_timeout;
    let request = CompletionRequest {
        model: state.config.model_name.clone(),
        messages,
        temperature: state.config.temperature,
        max_tokens: state.config.max_tokens,
        timeout,
    };

    let started = Instant::now();
    let outcome = tokio::time::timeout(timeout, gateway.complete(request)).await;
    metrics::observe_gateway_latency(started.elapsed().as_secs_f64());

    let raw = outcome.map_err(|_| ChatError::GatewayTimeout(timeout))??;
    let reply = raw.trim();
    if reply.is_empty() {
        return Err(ChatError::EmptyReply);
    }

    state.memory.add(session_id, Role::Assistant, reply);
    Ok(reply.to_string())
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = payload.validate() {
        metrics::inc_request("chat", "invalid");
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ));
    }

    let request_num = state.counters.inc_total_requests();
    let request_id = Uuid::new_v4();
    let span = info_span!("chat", %request_id, session_id = %payload.session_id);

    let response = async move {
        info!("Chat request #{} ({} chars)", request_num, payload.message.chars().count());

        let reply = match relay_turn(&state, &payload.session_id, &payload.message).await {
            Ok(reply) => {
                metrics::inc_request("chat", "ok");
                reply
            }
            Err(err) => {
                match &err {
                    ChatError::MissingCredentials => {
                        error!("Provider API key missing, answering with fallback")
                    }
                    ChatError::GatewayTimeout(after) => {
                        error!("Chat completion timed out after {:?}", after)
                    }
                    ChatError::GatewayError(detail) => {
                        error!("Chat completion failed: {}", detail)
                    }
                    ChatError::EmptyReply => error!("Chat completion failed: empty model reply"),
                }
                let fallbacks = state.counters.inc_fallback_replies();
                info!("Fallback reply #{} ({})", fallbacks, err.reason());
                metrics::inc_request("chat", "fallback");
                metrics::inc_fallback(err.reason());
                FALLBACK_MESSAGE.to_string()
            }
        };

        metrics::set_active_sessions(state.memory.session_count());
        Json(ChatResponse { reply })
    }
    .instrument(span)
    .await;

    Ok(response)
}

/// DELETE /chat/:session_id
pub async fn clear_chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<ClearedResponse> {
    info!("Clearing conversation: {}", session_id);
    state.memory.clear(&session_id);
    metrics::inc_request("clear_chat", "ok");
    metrics::set_active_sessions(state.memory.session_count());
    Json(ClearedResponse {
        status: "cleared".to_string(),
    })
}
