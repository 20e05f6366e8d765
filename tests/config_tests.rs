use mock_interview::{Config, SessionConfig};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_load_config_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("interview.toml");
    std::fs::write(
        &path,
        r#"
[service]
name = "mock-interview"

[service.http]
bind = "0.0.0.0"
port = 3100

[nats]
url = "nats://localhost:4222"

[backend]
base_url = "http://localhost:3000"

[interview]
settle_delay_ms = 500
"#,
    )
    .unwrap();

    let cfg = Config::load(path.to_str().unwrap()).unwrap();

    assert_eq!(cfg.service.http.port, 3100);
    assert_eq!(cfg.backend.request_timeout_secs, 60);
    assert_eq!(cfg.interview.settle_delay(), Duration::from_millis(500));
    assert_eq!(cfg.interview.narration_timeout(), Duration::from_secs(30));
    assert_eq!(cfg.interview.default_question_seconds, 60);
    assert_eq!(cfg.storage.transcripts_path, "data/transcripts");
}

#[test]
fn test_missing_config_file_fails() {
    assert!(Config::load("/nonexistent/mock-interview").is_err());
}

#[test]
fn test_session_config_takes_interview_settings() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("interview.toml");
    std::fs::write(
        &path,
        r#"
[service]
name = "mock-interview"
http = { bind = "127.0.0.1", port = 3100 }

[nats]
url = "nats://localhost:4222"

[backend]
base_url = "http://localhost:3000"

[interview]
narration_timeout_secs = 10
default_question_seconds = 90
"#,
    )
    .unwrap();
    let cfg = Config::load(path.to_str().unwrap()).unwrap();

    let session = SessionConfig::new("resume-1", "user-1", 15).with_interview_settings(&cfg.interview);

    assert!(session.session_id.starts_with("interview-"));
    assert_eq!(session.narration_timeout, Duration::from_secs(10));
    assert_eq!(session.default_question_seconds, 90);
    assert_eq!(session.settle_delay, Duration::from_secs(1));
    assert!(session.validate().is_ok());

    let empty = SessionConfig::new("", "user-1", 15);
    assert!(empty.validate().is_err());
}
