use crate::services::{Assessor, Scorecard, TranscriptRecord, TranscriptStore};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// Where the post-interview assessment stands
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum AssessmentStatus {
    NotSubmitted,
    Pending,
    Scored(Scorecard),
    /// Assessment failed; the transcript is still kept
    Unavailable(String),
    /// Nothing was answered, so nothing was sent
    Skipped,
}

impl AssessmentStatus {
    pub fn scorecard(&self) -> Option<&Scorecard> {
        match self {
            AssessmentStatus::Scored(scorecard) => Some(scorecard),
            _ => None,
        }
    }
}

/// Submits a finished transcript for assessment, at most once per session
pub struct ResultPublisher {
    assessor: Arc<dyn Assessor>,
    store: Option<Arc<dyn TranscriptStore>>,
    submitted: bool,
    status: AssessmentStatus,
    record: Option<TranscriptRecord>,
    outcome: Option<oneshot::Receiver<Result<Scorecard, String>>>,
}

impl ResultPublisher {
    pub fn new(assessor: Arc<dyn Assessor>, store: Option<Arc<dyn TranscriptStore>>) -> Self {
        Self {
            assessor,
            store,
            submitted: false,
            status: AssessmentStatus::NotSubmitted,
            record: None,
            outcome: None,
        }
    }

    pub fn status(&self) -> &AssessmentStatus {
        &self.status
    }

    pub fn record(&self) -> Option<&TranscriptRecord> {
        self.record.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.outcome.is_some()
    }

    /// Submitted (or skipped) and no longer waiting on the assessor
    pub fn is_settled(&self) -> bool {
        self.submitted && !self.is_pending()
    }

    /// Send the transcript for assessment and persist it with whatever comes back
    pub fn submit(&mut self, record: TranscriptRecord) {
        if self.submitted {
            warn!("Transcript for {} already submitted", record.session_id);
            return;
        }
        self.submitted = true;

        if record.qa.is_empty() {
            info!("No answers recorded for {}; skipping assessment", record.session_id);
            self.status = AssessmentStatus::Skipped;
            self.record = Some(record);
            return;
        }

        info!(
            "Submitting {} answers for assessment ({})",
            record.qa.len(),
            record.session_id
        );

        let (tx, rx) = oneshot::channel();
        let assessor = Arc::clone(&self.assessor);
        let store = self.store.clone();
        let mut persisted = record.clone();

        tokio::spawn(async move {
            let request = persisted.assessment_request();
            let result = match assessor.assess(&request).await {
                Ok(scorecard) => scorecard.validate().map(|_| scorecard),
                Err(e) => Err(e),
            };

            persisted.scorecard = result.as_ref().ok().cloned();
            if let Some(store) = store {
                if let Err(e) = store.save(&persisted).await {
                    error!("Failed to persist transcript {}: {:#}", persisted.session_id, e);
                }
            }

            // The session may have been released already
            let _ = tx.send(result.map_err(|e| format!("{:#}", e)));
        });

        self.status = AssessmentStatus::Pending;
        self.record = Some(record);
        self.outcome = Some(rx);
    }

    /// Resolves once the assessment task reports back
    pub async fn outcome(&mut self) -> Result<Scorecard, String> {
        match self.outcome.as_mut() {
            Some(rx) => match rx.await {
                Ok(result) => result,
                Err(_) => Err("assessment task ended without a result".to_string()),
            },
            None => std::future::pending().await,
        }
    }

    pub fn complete(&mut self, result: Result<Scorecard, String>) {
        self.outcome = None;

        match result {
            Ok(scorecard) => {
                info!("Assessment received: score {:.1}/10", scorecard.score);
                if let Some(record) = self.record.as_mut() {
                    record.scorecard = Some(scorecard.clone());
                }
                self.status = AssessmentStatus::Scored(scorecard);
            }
            Err(reason) => {
                warn!("Scorecard unavailable: {}", reason);
                self.status = AssessmentStatus::Unavailable(reason);
            }
        }
    }
}
