//! HTTP request handlers

use std::sync::Arc;

use axum::extract::FromRef;
use axum::extract::State;
use axum::response::Html;
use axum::Form;
use axum::Json;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::Key;
use axum_extra::extract::SignedCookieJar;
use tracing::info;
use tracing::warn;

use crate::api::render;
use crate::api::session::ConversationTurn;
use crate::api::session::SessionStore;
use crate::api::types::ApiResponse;
use crate::api::types::AskForm;
use crate::api::types::HealthResponse;
use crate::audit::AuditLogger;
use crate::errors::GuideChatError;
use crate::rag::RagService;

/// Name of the signed cookie carrying the session id
pub const SESSION_COOKIE: &str = "guidechat_session";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<RagService>,
    pub sessions: Arc<SessionStore>,
    pub audit: Arc<AuditLogger>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Health check handler
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Render the current transcript (GET /)
pub async fn chat_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Html<String>) {
    let (jar, session_id) = ensure_session(&state, jar);

    let turns = state
        .sessions
        .get_session(&session_id)
        .map(|s| s.turns)
        .unwrap_or_default();

    (jar, Html(render::render_page(&turns)))
}

/// Answer a question and render the updated transcript (POST /)
pub async fn ask(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<AskForm>,
) -> (SignedCookieJar, Html<String>) {
    let (jar, session_id) = ensure_session(&state, jar);
    let query = form.query;

    info!("POST /: {}", query);

    let response = match state.rag.query(&query).await {
        Ok(result) => result.answer,
        Err(e) => user_visible_error(&e),
    };

    state.sessions.append_turn(
        &session_id,
        ConversationTurn {
            query: query.clone(),
            response: response.clone(),
        },
    );

    // Fire-and-forget; the rendered response never depends on this
    state.audit.log_turn(&session_id, &query, &response);

    let turns = state
        .sessions
        .get_session(&session_id)
        .map(|s| s.turns)
        .unwrap_or_default();

    (jar, Html(render::render_page(&turns)))
}

/// Resolve the session from the signed cookie, creating one when the cookie
/// is absent, tampered with, or references a session that no longer exists
/// (expired or from before a restart). The signed jar rejects forged cookies
/// before we ever see them.
fn ensure_session(state: &AppState, jar: SignedCookieJar) -> (SignedCookieJar, String) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let session_id = cookie.value().to_string();
        if state.sessions.get_session(&session_id).is_some() {
            return (jar, session_id);
        }
    }

    let session = state.sessions.create_session();
    let session_id = session.session_id;
    info!("Created new session: {}", session_id);

    let cookie = Cookie::build((SESSION_COOKIE, session_id.clone()))
        .path("/")
        .http_only(true);

    (jar.add(cookie), session_id)
}

/// Convert a pipeline failure into the transcript entry shown to the user.
/// The request still completes; the failure becomes the "answer".
fn user_visible_error(error: &GuideChatError) -> String {
    match error {
        GuideChatError::Generation(detail) => {
            warn!("Generation failed: {}", detail);
            format!("\u{26a0}\u{fe0f} Error generating response: {detail}")
        }
        other => {
            warn!("Retrieval failed: {}", other);
            format!("\u{26a0}\u{fe0f} Error retrieving context: {other}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_failure_message_carries_detail() {
        let message =
            user_visible_error(&GuideChatError::Generation("quota exceeded".to_string()));
        assert_eq!(message, "⚠️ Error generating response: quota exceeded");
    }

    #[test]
    fn test_retrieval_failure_message_carries_detail() {
        let message =
            user_visible_error(&GuideChatError::VectorIndex("index unreachable".to_string()));
        assert!(message.starts_with("⚠️ Error retrieving context:"));
        assert!(message.contains("index unreachable"));
    }
}
