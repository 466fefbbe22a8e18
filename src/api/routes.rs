//! API route definitions

use axum::routing::get;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create the application router
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        // Chat transcript: render on GET, answer-and-render on POST
        .route("/", get(handlers::chat_page).post(handlers::ask))
        // Health check
        .route("/health", get(handlers::health))
        .with_state(state)
}
