use crate::config::InterviewConfig;
use crate::error::InterviewError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one interview session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "interview-7f3c...")
    pub session_id: String,

    /// Resume the questions are generated from
    pub resume_id: String,

    /// Candidate the transcript belongs to
    pub user_id: String,

    /// Overall interview budget
    pub duration_minutes: u32,

    /// Pause after narration before capture is re-armed, so the tail of the
    /// synthesized audio is not transcribed
    pub settle_delay: Duration,

    /// Narration taking longer than this is treated as finished
    pub narration_timeout: Duration,

    /// Clock resolution; both countdowns move one step per tick
    pub tick_period: Duration,

    /// Budget for questions that come back without one
    pub default_question_seconds: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("interview-{}", uuid::Uuid::new_v4()),
            resume_id: String::new(),
            user_id: String::new(),
            duration_minutes: 10,
            settle_delay: Duration::from_secs(1),
            narration_timeout: Duration::from_secs(30),
            tick_period: Duration::from_secs(1),
            default_question_seconds: 60,
        }
    }
}

impl SessionConfig {
    pub fn new(
        resume_id: impl Into<String>,
        user_id: impl Into<String>,
        duration_minutes: u32,
    ) -> Self {
        Self {
            resume_id: resume_id.into(),
            user_id: user_id.into(),
            duration_minutes,
            ..Self::default()
        }
    }

    /// Apply the service-wide interview settings
    pub fn with_interview_settings(mut self, settings: &InterviewConfig) -> Self {
        self.settle_delay = settings.settle_delay();
        self.narration_timeout = settings.narration_timeout();
        self.default_question_seconds = settings.default_question_seconds;
        self
    }

    pub fn validate(&self) -> Result<(), InterviewError> {
        if !is_valid_session_id(&self.session_id) {
            return Err(InterviewError::InvalidRequest(
                "session_id must be 1-128 characters of [A-Za-z0-9_-]".to_string(),
            ));
        }
        if self.resume_id.trim().is_empty() {
            return Err(InterviewError::InvalidRequest("resume_id is required".to_string()));
        }
        if self.user_id.trim().is_empty() {
            return Err(InterviewError::InvalidRequest("user_id is required".to_string()));
        }
        if self.duration_minutes == 0 {
            return Err(InterviewError::InvalidRequest(
                "duration_minutes must be positive".to_string(),
            ));
        }
        if self.tick_period.is_zero() {
            return Err(InterviewError::InvalidRequest(
                "tick_period must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Session ids double as transcript file names
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
