use super::messages::{
    CaptureAction, CaptureControlMessage, SpeakReply, SpeakRequest, SpeechCancelMessage,
};
use anyhow::{Context, Result};
use async_nats::Client;
use tracing::{debug, info};

pub const TRANSCRIPT_SUBJECT: &str = "stt.text.>";
pub const SPEAK_SUBJECT: &str = "tts.speak";
pub const SPEECH_CANCEL_SUBJECT: &str = "tts.cancel";

#[derive(Clone)]
pub struct NatsClient {
    client: Client,
    session_id: String,
}

impl NatsClient {
    /// Connect to NATS server
    pub async fn connect(url: &str, session_id: String) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        // Speech requests are bounded by the session's narration timeout,
        // not the client's default request timeout
        let client = async_nats::ConnectOptions::new()
            .request_timeout(None)
            .connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client, session_id })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Ask the STT service to start or stop listening for this session
    pub async fn publish_capture_control(&self, action: CaptureAction) -> Result<()> {
        let subject = capture_control_subject(action);

        let message = CaptureControlMessage {
            session_id: self.session_id.clone(),
            action,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish capture control")?;

        debug!("Published {} for {}", subject, self.session_id);
        Ok(())
    }

    /// Subscribe to transcript messages
    pub async fn subscribe_transcripts(&self) -> Result<async_nats::Subscriber> {
        // STT publishes to stt.text.partial and stt.text.final for every
        // session; callers filter by session_id in the payload
        info!("Subscribing to transcripts on {}", TRANSCRIPT_SUBJECT);

        let subscriber = self
            .client
            .subscribe(TRANSCRIPT_SUBJECT)
            .await
            .context("Failed to subscribe to transcripts")?;

        Ok(subscriber)
    }

    /// Request narration of `text`; resolves with the TTS service's reply
    pub async fn request_speech(&self, text: &str) -> Result<SpeakReply> {
        let request = SpeakRequest {
            session_id: self.session_id.clone(),
            text: text.to_string(),
            lang: "en-US".to_string(),
            rate: 1.0,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let payload = serde_json::to_vec(&request)?;

        let reply = self
            .client
            .request(SPEAK_SUBJECT, payload.into())
            .await
            .context("Speech request failed")?;

        serde_json::from_slice(&reply.payload).context("Failed to parse speech reply")
    }

    pub async fn publish_speech_cancel(&self) -> Result<()> {
        let message = SpeechCancelMessage {
            session_id: self.session_id.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(SPEECH_CANCEL_SUBJECT, payload.into())
            .await
            .context("Failed to publish speech cancel")?;

        Ok(())
    }
}

pub fn capture_control_subject(action: CaptureAction) -> String {
    format!("stt.control.{}", action.as_str())
}
