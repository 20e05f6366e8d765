use super::machine::{CaptureState, SessionMachine};
use super::publisher::AssessmentStatus;
use super::state::{CompletionSummary, EndReason, Phase, QaEntry, Question};
use crate::services::Scorecard;
use serde::Serialize;

/// Read-only view of a session for presentation
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: Phase,
    pub current_index: usize,
    pub question_count: usize,
    pub current_question: Option<Question>,
    pub per_question_remaining_seconds: u32,
    pub overall_remaining_seconds: u32,
    pub live_transcript_preview: String,
    pub capture_active: bool,
    pub narrating: bool,
    pub microphone_enabled: bool,
    pub answers: Vec<QaEntry>,
    pub end_reason: Option<EndReason>,
    pub summary: Option<CompletionSummary>,
    pub assessment: AssessmentStatus,
}

impl SessionSnapshot {
    pub(crate) fn capture(
        session_id: &str,
        machine: &SessionMachine,
        assessment: &AssessmentStatus,
    ) -> Self {
        let session = machine.session();

        Self {
            session_id: session_id.to_string(),
            phase: session.phase,
            current_index: session.current_index,
            question_count: session.questions.len(),
            current_question: session.current_question().cloned(),
            per_question_remaining_seconds: session.per_question_remaining_seconds,
            overall_remaining_seconds: session.overall_remaining_seconds,
            live_transcript_preview: session.live_transcript_preview(),
            capture_active: machine.capture_state() != CaptureState::Idle,
            narrating: machine.is_narrating(),
            microphone_enabled: machine.microphone_enabled(),
            answers: session.answers.clone(),
            end_reason: session.end_reason.clone(),
            summary: session.is_ended().then(|| session.summary()),
            assessment: assessment.clone(),
        }
    }

    /// Ended, and the assessment is no longer outstanding
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Ended
            && !matches!(
                self.assessment,
                AssessmentStatus::Pending | AssessmentStatus::NotSubmitted
            )
    }

    pub fn scorecard(&self) -> Option<&Scorecard> {
        self.assessment.scorecard()
    }

    /// Reason the session could not start, if that is how it ended
    pub fn setup_failure(&self) -> Option<&str> {
        match &self.end_reason {
            Some(EndReason::SetupFailed(reason)) => Some(reason),
            _ => None,
        }
    }
}
