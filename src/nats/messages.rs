use serde::{Deserialize, Serialize};

/// Transcript message received from STT service
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub session_id: String,
    pub text: String,
    pub partial: bool,
    pub timestamp: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureAction {
    Start,
    Stop,
}

impl CaptureAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureAction::Start => "start",
            CaptureAction::Stop => "stop",
        }
    }
}

/// Tells the STT service to open or close the microphone for a session
#[derive(Debug, Serialize, Deserialize)]
pub struct CaptureControlMessage {
    pub session_id: String,
    pub action: CaptureAction,
    pub timestamp: String, // RFC3339 timestamp
}

/// Text-to-speech request; the TTS service replies once playback has finished
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeakRequest {
    pub session_id: String,
    pub text: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_rate")]
    pub rate: f32,
    pub timestamp: String,
}

/// Reply to a `SpeakRequest`
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeakReply {
    pub session_id: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Stop whatever the TTS service is playing for a session
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeechCancelMessage {
    pub session_id: String,
    pub timestamp: String,
}

fn default_lang() -> String {
    "en-US".to_string()
}

fn default_rate() -> f32 {
    1.0
}
