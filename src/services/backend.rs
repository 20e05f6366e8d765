use super::models::{AssessmentRequest, Scorecard};
use super::{Assessor, QuestionSource, ResumeSource};
use crate::session::Question;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// JSON client for the interview backend
///
/// - GET  /api/resumes/:user_id/:resume_id
/// - POST /api/interview/questions
/// - POST /api/interview/assessment
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ResumeDocument {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionsRequest<'a> {
    resume_content: &'a str,
    duration: u32,
}

#[derive(Debug, Deserialize)]
struct QuestionsResponse {
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct AssessmentResponse {
    assessment: Option<Scorecard>,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl ResumeSource for BackendClient {
    async fn resume_text(&self, user_id: &str, resume_id: &str) -> Result<String> {
        let url = self.url(&format!("/api/resumes/{}/{}", user_id, resume_id));

        let resume: ResumeDocument = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to reach resume service")?
            .error_for_status()
            .context("Resume lookup rejected")?
            .json()
            .await
            .context("Failed to parse resume")?;

        Ok(resume.content)
    }
}

#[async_trait::async_trait]
impl QuestionSource for BackendClient {
    async fn generate_questions(
        &self,
        resume_text: &str,
        duration_minutes: u32,
    ) -> Result<Vec<Question>> {
        let response: QuestionsResponse = self
            .http
            .post(self.url("/api/interview/questions"))
            .json(&QuestionsRequest {
                resume_content: resume_text,
                duration: duration_minutes,
            })
            .send()
            .await
            .context("Failed to reach question service")?
            .error_for_status()
            .context("Question generation rejected")?
            .json()
            .await
            .context("Failed to parse generated questions")?;

        info!("Question service returned {} questions", response.questions.len());

        Ok(response.questions)
    }
}

#[async_trait::async_trait]
impl Assessor for BackendClient {
    async fn assess(&self, request: &AssessmentRequest) -> Result<Scorecard> {
        let response: AssessmentResponse = self
            .http
            .post(self.url("/api/interview/assessment"))
            .json(request)
            .send()
            .await
            .context("Failed to reach assessment service")?
            .error_for_status()
            .context("Assessment rejected")?
            .json()
            .await
            .context("Failed to parse assessment")?;

        response
            .assessment
            .context("Assessment service returned no scorecard")
    }
}
