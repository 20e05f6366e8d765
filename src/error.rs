use thiserror::Error;

/// Conditions reported to whoever drives an interview (HTTP client or CLI)
#[derive(Debug, Error)]
pub enum InterviewError {
    #[error("invalid interview request: {0}")]
    InvalidRequest(String),
    #[error("interview session {0} not found")]
    SessionNotFound(String),
    #[error("interview session {0} already exists")]
    SessionExists(String),
    #[error("cannot start interview: {0}")]
    CannotStart(String),
}
