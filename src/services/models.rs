use crate::session::{CompletionSummary, EndReason, QaEntry};
use anyhow::{ensure, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body sent to the assessment service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRequest {
    pub resume_id: String,
    pub user_id: String,
    pub qa: Vec<QaEntry>,
}

/// Structured result returned by the assessment service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    /// Overall score out of 10
    pub score: f64,
    pub clarity: String,
    pub technical: String,
    pub completeness: String,
    pub professionalism: String,
    pub strengths: String,
    pub weaknesses: String,
    pub suggestions: String,
}

impl Scorecard {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.score.is_finite() && (0.0..=10.0).contains(&self.score),
            "scorecard score {} is outside 0-10",
            self.score
        );
        Ok(())
    }
}

/// What gets persisted for a finished interview
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRecord {
    pub session_id: String,
    pub resume_id: String,
    pub user_id: String,
    pub qa: Vec<QaEntry>,
    pub summary: CompletionSummary,
    pub end_reason: EndReason,
    pub scorecard: Option<Scorecard>,
    pub created_at: DateTime<Utc>,
}

impl TranscriptRecord {
    pub fn assessment_request(&self) -> AssessmentRequest {
        AssessmentRequest {
            resume_id: self.resume_id.clone(),
            user_id: self.user_id.clone(),
            qa: self.qa.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorecard(score: f64) -> Scorecard {
        Scorecard {
            score,
            clarity: "Clear".to_string(),
            technical: "Solid".to_string(),
            completeness: "Mostly complete".to_string(),
            professionalism: "Professional".to_string(),
            strengths: "Caching".to_string(),
            weaknesses: "Brevity".to_string(),
            suggestions: "Give examples".to_string(),
        }
    }

    #[test]
    fn test_scorecard_range() {
        assert!(scorecard(0.0).validate().is_ok());
        assert!(scorecard(7.5).validate().is_ok());
        assert!(scorecard(10.0).validate().is_ok());
        assert!(scorecard(11.0).validate().is_err());
        assert!(scorecard(-1.0).validate().is_err());
        assert!(scorecard(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_assessment_request_uses_camel_case() {
        let request = AssessmentRequest {
            resume_id: "r-1".to_string(),
            user_id: "u-1".to_string(),
            qa: vec![QaEntry {
                question: "Q".to_string(),
                answer: "A".to_string(),
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["resumeId"], "r-1");
        assert_eq!(json["userId"], "u-1");
        assert_eq!(json["qa"][0]["answer"], "A");
    }
}
