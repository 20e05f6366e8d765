use chrono::Utc;
use mock_interview::session::CompletionSummary;
use mock_interview::{EndReason, JsonTranscriptStore, QaEntry, TranscriptRecord, TranscriptStore};
use tempfile::TempDir;

fn record(session_id: &str) -> TranscriptRecord {
    TranscriptRecord {
        session_id: session_id.to_string(),
        resume_id: "resume-1".to_string(),
        user_id: "user-1".to_string(),
        qa: vec![
            QaEntry {
                question: "Tell me about yourself.".to_string(),
                answer: "I write Rust.".to_string(),
            },
            QaEntry {
                question: "Why this team?".to_string(),
                answer: "No answer provided".to_string(),
            },
        ],
        summary: CompletionSummary::new(3, 2),
        end_reason: EndReason::OverallTimeout,
        scorecard: None,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_save_and_load_transcript() {
    let temp = TempDir::new().unwrap();
    let store = JsonTranscriptStore::new(temp.path().join("transcripts")).unwrap();
    assert!(store.dir().exists());

    store.save(&record("interview-1")).await.unwrap();

    let path = store.dir().join("interview-1.json");
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"sessionId\": \"interview-1\""));
    assert!(raw.contains("\"completionRate\": 67"));

    let loaded = store.load("interview-1").await.unwrap();
    assert_eq!(loaded.qa.len(), 2);
    assert_eq!(loaded.end_reason, EndReason::OverallTimeout);
    assert!(loaded.scorecard.is_none());
}

#[tokio::test]
async fn test_load_missing_transcript_fails() {
    let temp = TempDir::new().unwrap();
    let store = JsonTranscriptStore::new(temp.path()).unwrap();

    let err = store.load("interview-404").await.unwrap_err();
    assert!(err.to_string().contains("interview-404.json"));
}

#[tokio::test]
async fn test_save_refuses_path_like_session_id() {
    let temp = TempDir::new().unwrap();
    let store = JsonTranscriptStore::new(temp.path().join("transcripts")).unwrap();

    let err = store.save(&record("../escaped")).await.unwrap_err();

    assert!(err.to_string().contains("../escaped"));
    assert!(!temp.path().join("escaped.json").exists());
}
