use mock_interview::nats::client::capture_control_subject;
use mock_interview::nats::messages::{
    CaptureAction, CaptureControlMessage, SpeakReply, SpeakRequest, TranscriptMessage,
};

#[test]
fn test_transcript_deserialization() {
    let json = r#"{
        "session_id": "interview-42",
        "text": "I built a cache.",
        "partial": false,
        "timestamp": "2025-10-27T14:30:05Z",
        "confidence": 0.95
    }"#;

    let msg: TranscriptMessage = serde_json::from_str(json).unwrap();
    assert_eq!(msg.session_id, "interview-42");
    assert_eq!(msg.text, "I built a cache.");
    assert!(!msg.partial);
    assert_eq!(msg.confidence, Some(0.95));
    assert_eq!(msg.timestamp, "2025-10-27T14:30:05Z");
}

#[test]
fn test_transcript_partial() {
    let json = r#"{
        "session_id": "interview-42",
        "text": "I built",
        "partial": true,
        "timestamp": "2025-10-27T14:30:05Z",
        "confidence": 0.87
    }"#;

    let msg: TranscriptMessage = serde_json::from_str(json).unwrap();
    assert!(msg.partial);
    assert_eq!(msg.text, "I built");
}

#[test]
fn test_transcript_no_confidence() {
    let json = r#"{
        "session_id": "interview-42",
        "text": "No confidence score",
        "partial": false,
        "timestamp": "2025-10-27T14:30:05Z"
    }"#;

    let msg: TranscriptMessage = serde_json::from_str(json).unwrap();
    assert_eq!(msg.confidence, None);
}

#[test]
fn test_capture_control_serialization() {
    let msg = CaptureControlMessage {
        session_id: "interview-42".to_string(),
        action: CaptureAction::Start,
        timestamp: "2025-10-27T14:30:00Z".to_string(),
    };

    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"action\":\"start\""));
    assert_eq!(capture_control_subject(CaptureAction::Start), "stt.control.start");
    assert_eq!(capture_control_subject(CaptureAction::Stop), "stt.control.stop");
}

#[test]
fn test_speak_request_defaults() {
    let json = r#"{
        "session_id": "interview-42",
        "text": "Tell me about yourself.",
        "timestamp": "2025-10-27T14:30:00Z"
    }"#;

    let msg: SpeakRequest = serde_json::from_str(json).unwrap();
    assert_eq!(msg.lang, "en-US");
    assert_eq!(msg.rate, 1.0);
}

#[test]
fn test_speak_reply_error() {
    let ok: SpeakReply = serde_json::from_str(r#"{ "session_id": "interview-42" }"#).unwrap();
    assert!(ok.error.is_none());

    let failed: SpeakReply =
        serde_json::from_str(r#"{ "session_id": "interview-42", "error": "no voice" }"#).unwrap();
    assert_eq!(failed.error.as_deref(), Some("no voice"));
}
