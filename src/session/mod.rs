//! Live interview session management
//!
//! This module provides the interview session that:
//! - Fetches questions for a resume
//! - Narrates each question and captures the spoken answer
//! - Runs the overall and per-question countdowns from one clock
//! - Assembles the question/answer transcript
//! - Submits the transcript for assessment when the interview ends

mod clock;
mod config;
mod handle;
mod machine;
mod publisher;
mod session;
mod snapshot;
mod state;

pub use clock::Clock;
pub use config::{is_valid_session_id, SessionConfig};
pub use handle::InterviewHandle;
pub use machine::{CaptureState, Effect, MachineSettings, SessionEvent, SessionMachine};
pub use publisher::{AssessmentStatus, ResultPublisher};
pub use session::start_session;
pub use snapshot::SessionSnapshot;
pub use state::{
    normalize_questions, CompletionSummary, EndReason, Phase, QaEntry, Question, Session,
    SessionTranscript, NO_ANSWER,
};
