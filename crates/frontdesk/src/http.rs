// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat-facing HTTP API and the Telegram webhook endpoint.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use frontdesk_bridge::Ingestor;
use frontdesk_core::{FrontdeskError, Role, SessionId};
use frontdesk_router::prompt::FALLBACK_SYSTEM_PROMPT;
use frontdesk_router::{SessionRouter, TurnOutcome};
use frontdesk_storage::queries::{businesses, messages, sessions};
use frontdesk_storage::Database;
use frontdesk_telegram::WireUpdate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub sessions: Arc<SessionRouter>,
    pub ingestor: Arc<Ingestor>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/history", get(history))
        .route("/api/reset", post(reset))
        .route("/telegram/webhook/{business_id}", post(webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    business_id: String,
    #[serde(default)]
    chat_key: Option<String>,
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    /// `null` while a human tunnel is active; the reply arrives out of band.
    response: Option<String>,
    chat_key: String,
    appointment_booked: bool,
    handoff_pending: bool,
    handoff_active: bool,
}

impl From<TurnOutcome> for ChatResponse {
    fn from(outcome: TurnOutcome) -> Self {
        match outcome {
            TurnOutcome::Reply {
                chat_key,
                text,
                appointment_booked,
                handoff_requested,
            } => Self {
                response: Some(text),
                chat_key,
                appointment_booked,
                handoff_pending: handoff_requested,
                handoff_active: false,
            },
            TurnOutcome::HandoffPending { chat_key, text } => Self {
                response: Some(text),
                chat_key,
                appointment_booked: false,
                handoff_pending: true,
                handoff_active: false,
            },
            TurnOutcome::HandoffActive { chat_key } => Self {
                response: None,
                chat_key,
                appointment_booked: false,
                handoff_pending: false,
                handoff_active: true,
            },
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": frontdesk_storage::now_timestamp(),
    }))
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    let message = request.message.trim();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Message cannot be empty" })),
        )
            .into_response();
    }

    match state
        .sessions
        .handle_turn(&request.business_id, request.chat_key.as_deref(), message)
        .await
    {
        Ok(outcome) => Json(ChatResponse::from(outcome)).into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct SessionParams {
    business_id: String,
    chat_key: String,
}

#[derive(Debug, Serialize)]
struct HistoryEntry {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    messages: Vec<HistoryEntry>,
    handoff_status: Option<String>,
    agent_response_pending: bool,
}

async fn history(State(state): State<AppState>, Query(params): Query<SessionParams>) -> Response {
    let session_id = SessionId::compose(&params.business_id, &params.chat_key);
    let session = match sessions::get_session(&state.db, session_id.as_str()).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            return Json(HistoryResponse {
                messages: Vec::new(),
                handoff_status: None,
                agent_response_pending: false,
            })
            .into_response();
        }
        Err(error) => return error_response(error).into_response(),
    };

    let log = match messages::session_log(&state.db, session_id.as_str()).await {
        Ok(log) => log,
        Err(error) => return error_response(error).into_response(),
    };
    let entries = log
        .into_iter()
        .filter(|m| m.role != Role::System)
        .map(|m| HistoryEntry {
            role: m.role.to_string(),
            content: m.content,
        })
        .collect();

    Json(HistoryResponse {
        messages: entries,
        handoff_status: Some(session.handoff_status.to_string()),
        agent_response_pending: session.agent_response_pending,
    })
    .into_response()
}

async fn reset(State(state): State<AppState>, Json(params): Json<SessionParams>) -> Response {
    let business = match businesses::get_business(&state.db, &params.business_id).await {
        Ok(Some(business)) => business,
        Ok(None) => {
            return error_response(FrontdeskError::NotFound {
                entity: "business",
                id: params.business_id,
            })
            .into_response();
        }
        Err(error) => return error_response(error).into_response(),
    };

    let session_id = SessionId::compose(&params.business_id, &params.chat_key);
    let seed = if business.system_prompt.is_empty() {
        FALLBACK_SYSTEM_PROMPT
    } else {
        business.system_prompt.as_str()
    };
    if let Err(error) = messages::reset_session_log(&state.db, session_id.as_str(), seed).await {
        return error_response(error).into_response();
    }
    debug!(session_id = %session_id, "session log reset");
    Json(json!({ "ok": true })).into_response()
}

/// Push-path updates. Always answers 200 so Telegram does not retry; any
/// handler failure is logged instead.
async fn webhook(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    Json(payload): Json<Value>,
) -> Json<Value> {
    match serde_json::from_value::<WireUpdate>(payload) {
        Ok(wire) => {
            if let Some(update) = wire.into_operator_update() {
                if let Err(error) = state.ingestor.handle_update(&business_id, update).await {
                    warn!(business_id, error = %error, "webhook update failed");
                }
            } else {
                debug!(business_id, "webhook update carried no actionable event");
            }
        }
        Err(error) => {
            warn!(business_id, error = %error, "unparseable webhook payload");
        }
    }
    Json(json!({ "ok": true }))
}

fn error_response(error: FrontdeskError) -> (StatusCode, Json<Value>) {
    let status = match &error {
        FrontdeskError::NotFound { .. } => StatusCode::NOT_FOUND,
        FrontdeskError::Gateway { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": error.to_string() })))
}
