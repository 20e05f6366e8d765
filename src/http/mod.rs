//! HTTP API for driving interview sessions
//!
//! - POST /interviews/start - Start a new interview
//! - POST /interviews/:id/next - Skip to the next question
//! - POST /interviews/:id/end - End the interview
//! - POST /interviews/:id/microphone - Mute or unmute capture
//! - GET /interviews/:id/status - Live session snapshot
//! - GET /interviews/:id/transcript - Question/answer transcript
//! - DELETE /interviews/:id - Release a session
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
