use super::state::AppState;
use crate::session::{CallStatus, SessionContext, SessionError, TutorSession};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct StartLessonResponse {
    pub lesson_id: Uuid,
    pub status: CallStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MicrophoneResponse {
    pub is_muted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

fn session_error_response(e: SessionError) -> Response {
    let status = match &e {
        SessionError::InvalidState { .. } => StatusCode::CONFLICT,
        SessionError::Channel(_) => StatusCode::BAD_GATEWAY,
    };
    error_response(status, format!("{:#}", e))
}

fn not_found(lesson_id: Uuid) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("Lesson {} not found", lesson_id))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /lessons
/// Create a lesson and issue its start command
pub async fn start_lesson(
    State(state): State<AppState>,
    Json(context): Json<SessionContext>,
) -> Response {
    let lesson_id = Uuid::new_v4();

    info!(
        "Starting lesson {} for companion {}",
        lesson_id, context.companion_id
    );

    let channel = match state.channels.open(lesson_id).await {
        Ok(channel) => channel,
        Err(e) => {
            error!("Failed to open voice channel: {:#}", e);
            return error_response(
                StatusCode::BAD_GATEWAY,
                format!("Failed to open voice channel: {:#}", e),
            );
        }
    };

    let session = Arc::new(TutorSession::with_id(
        lesson_id,
        context,
        channel,
        Arc::clone(&state.notifier),
        state.options.clone(),
    ));

    if let Err(e) = session.start().await {
        session.dispose().await;
        return session_error_response(e);
    }

    state.insert(Arc::clone(&session)).await;

    (
        StatusCode::CREATED,
        Json(StartLessonResponse {
            lesson_id,
            status: session.status(),
        }),
    )
        .into_response()
}

/// POST /lessons/:lesson_id/end
/// End a lesson from the learner's side
pub async fn end_lesson(State(state): State<AppState>, Path(lesson_id): Path<Uuid>) -> Response {
    match state.get(&lesson_id).await {
        Some(session) => {
            session.end().await;
            (StatusCode::OK, Json(session.snapshot())).into_response()
        }
        None => not_found(lesson_id),
    }
}

/// POST /lessons/:lesson_id/microphone
/// Toggle the learner's microphone
pub async fn toggle_microphone(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> Response {
    let Some(session) = state.get(&lesson_id).await else {
        return not_found(lesson_id);
    };

    match session.toggle_microphone().await {
        Ok(is_muted) => (StatusCode::OK, Json(MicrophoneResponse { is_muted })).into_response(),
        Err(e) => {
            error!("Failed to toggle microphone in lesson {}: {:#}", lesson_id, e);
            session_error_response(e)
        }
    }
}

/// GET /lessons/:lesson_id
/// Current lesson state
pub async fn get_lesson(State(state): State<AppState>, Path(lesson_id): Path<Uuid>) -> Response {
    match state.get(&lesson_id).await {
        Some(session) => (StatusCode::OK, Json(session.snapshot())).into_response(),
        None => not_found(lesson_id),
    }
}

/// GET /lessons/:lesson_id/transcript
/// Finalized transcript, most recent turn first
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> Response {
    match state.get(&lesson_id).await {
        Some(session) => (StatusCode::OK, Json(session.transcript().await)).into_response(),
        None => not_found(lesson_id),
    }
}

/// DELETE /lessons/:lesson_id
/// Leave a lesson: end it if still running and release its channel listener
pub async fn close_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> Response {
    let session = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&lesson_id)
    };

    match session {
        Some(session) => {
            session.end().await;
            session.dispose().await;
            (StatusCode::OK, Json(session.snapshot())).into_response()
        }
        None => not_found(lesson_id),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
