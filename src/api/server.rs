//! HTTP server implementation

use std::sync::Arc;

use axum_extra::extract::cookie::Key;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::api::session::SessionStore;
use crate::audit::AuditLogger;
use crate::config::AppConfig;
use crate::errors::GuideChatError;
use crate::rag::RagService;
use crate::Result;

/// Start the chat server
pub async fn serve(config: &AppConfig) -> Result<()> {
    info!("Starting guidechat server...");

    // Initialize services
    let rag = Arc::new(RagService::from_config(config)?);
    let sessions = Arc::new(SessionStore::new(config.session.timeout_secs));
    let audit = Arc::new(AuditLogger::from_config(config));
    let cookie_key = build_cookie_key(config)?;

    let state = AppState {
        rag,
        sessions,
        audit,
        cookie_key,
    };

    let app = routes::app_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    // Start server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /        - Render chat transcript");
    info!("  POST /        - Submit a question (form field: query)");
    info!("  GET  /health  - Health check");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the cookie signing key. A configured secret gives sessions
/// continuity across restarts; without one a fresh key is generated per
/// process start and every outstanding session cookie becomes invalid.
fn build_cookie_key(config: &AppConfig) -> Result<Key> {
    match config.session.secret_key.as_deref() {
        Some(secret) => {
            let bytes = STANDARD.decode(secret.trim()).map_err(|e| {
                GuideChatError::Config(format!("Session secret is not valid base64: {e}"))
            })?;
            if bytes.len() < 32 {
                return Err(GuideChatError::Config(
                    "Session secret must decode to at least 32 bytes".to_string(),
                ));
            }
            Ok(Key::derive_from(&bytes))
        }
        None => {
            info!("No session secret configured; all sessions reset on restart");
            let mut secret = [0u8; 64];
            rand::thread_rng().fill_bytes(&mut secret);
            Ok(Key::from(&secret))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_key_from_configured_secret() {
        let mut config = AppConfig::default();
        config.session.secret_key = Some(STANDARD.encode([7u8; 32]));

        assert!(build_cookie_key(&config).is_ok());
    }

    #[test]
    fn test_cookie_key_rejects_short_secret() {
        let mut config = AppConfig::default();
        config.session.secret_key = Some(STANDARD.encode([7u8; 8]));

        assert!(build_cookie_key(&config).is_err());
    }

    #[test]
    fn test_cookie_key_generated_when_unconfigured() {
        let config = AppConfig::default();
        assert!(build_cookie_key(&config).is_ok());
    }
}
