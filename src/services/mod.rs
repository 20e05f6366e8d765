//! Collaborators the interview session depends on but does not implement
//!
//! - Resume text lookup
//! - Question generation from a resume
//! - Assessment of a finished transcript
//! - Persistence of finished transcripts

mod backend;
mod models;
mod store;

pub use backend::BackendClient;
pub use models::{AssessmentRequest, Scorecard, TranscriptRecord};
pub use store::JsonTranscriptStore;

use crate::session::Question;
use anyhow::Result;
use std::sync::Arc;

#[async_trait::async_trait]
pub trait ResumeSource: Send + Sync {
    /// Plain text of a stored resume
    async fn resume_text(&self, user_id: &str, resume_id: &str) -> Result<String>;
}

#[async_trait::async_trait]
pub trait QuestionSource: Send + Sync {
    /// Ordered questions for an interview of `duration_minutes`.
    /// An empty list means no interview can be held.
    async fn generate_questions(
        &self,
        resume_text: &str,
        duration_minutes: u32,
    ) -> Result<Vec<Question>>;
}

#[async_trait::async_trait]
pub trait Assessor: Send + Sync {
    async fn assess(&self, request: &AssessmentRequest) -> Result<Scorecard>;
}

#[async_trait::async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn save(&self, record: &TranscriptRecord) -> Result<()>;
}

/// Service handles shared by every session
#[derive(Clone)]
pub struct InterviewServices {
    pub resumes: Arc<dyn ResumeSource>,
    pub questions: Arc<dyn QuestionSource>,
    pub assessor: Arc<dyn Assessor>,
    pub store: Option<Arc<dyn TranscriptStore>>,
}

impl InterviewServices {
    /// All three remote collaborators served by one backend
    pub fn from_backend(backend: Arc<BackendClient>, store: Option<Arc<dyn TranscriptStore>>) -> Self {
        Self {
            resumes: backend.clone(),
            questions: backend.clone(),
            assessor: backend,
            store,
        }
    }
}
