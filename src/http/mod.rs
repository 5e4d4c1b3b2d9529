//! HTTP API for the lesson UI shell
//!
//! This module provides a REST API for controlling voice lessons:
//! - POST /lessons - Create and start a lesson
//! - POST /lessons/:id/end - End a lesson
//! - POST /lessons/:id/microphone - Toggle the microphone
//! - GET /lessons/:id - Query lesson state
//! - GET /lessons/:id/transcript - Get the transcript, newest first
//! - DELETE /lessons/:id - Leave a lesson
//! - GET /health - Health check
//!
//! Finished lessons stay queryable for a grace period, then are released.

mod handlers;
mod routes;
mod state;

pub use handlers::{ErrorResponse, MicrophoneResponse, StartLessonResponse};
pub use routes::create_router;
pub use state::{AppState, DEFAULT_FINISHED_RETENTION};
