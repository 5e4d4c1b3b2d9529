use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Lesson control
        .route("/lessons", post(handlers::start_lesson))
        .route("/lessons/:lesson_id/end", post(handlers::end_lesson))
        .route(
            "/lessons/:lesson_id/microphone",
            post(handlers::toggle_microphone),
        )
        // Lesson queries
        .route(
            "/lessons/:lesson_id",
            get(handlers::get_lesson).delete(handlers::close_lesson),
        )
        .route("/lessons/:lesson_id/transcript", get(handlers::get_transcript))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
