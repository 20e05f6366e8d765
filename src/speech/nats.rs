use super::capture::{CaptureSink, SpeechCapture};
use super::narration::SpeechNarrator;
use super::{SpeechDeviceFactory, SpeechDevices};
use crate::nats::{CaptureAction, NatsClient, TranscriptMessage};
use anyhow::{Context, Result};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Speech capture backed by an STT service on NATS
pub struct NatsCapture {
    client: NatsClient,
    task: Option<JoinHandle<()>>,
}

impl NatsCapture {
    pub fn new(client: NatsClient) -> Self {
        Self { client, task: None }
    }
}

#[async_trait::async_trait]
impl SpeechCapture for NatsCapture {
    async fn start(&mut self, sink: CaptureSink) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let mut transcript_sub = self
            .client
            .subscribe_transcripts()
            .await
            .context("Failed to subscribe to transcripts")?;

        self.client
            .publish_capture_control(CaptureAction::Start)
            .await?;

        let session_id = self.client.session_id().to_string();
        sink.started();

        self.task = Some(tokio::spawn(async move {
            info!("Capture run {} started", sink.run());

            while let Some(msg) = transcript_sub.next().await {
                if sink.is_closed() {
                    break;
                }

                match serde_json::from_slice::<TranscriptMessage>(&msg.payload) {
                    Ok(transcript) => {
                        // Filter by session_id
                        if transcript.session_id != session_id {
                            continue;
                        }
                        sink.fragment(transcript.text, !transcript.partial);
                    }
                    Err(e) => {
                        warn!("Failed to parse transcript message: {}", e);
                    }
                }
            }

            // Only reached when the subscription closes underneath us
            sink.ended();
        }));

        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        task.abort();

        self.client
            .publish_capture_control(CaptureAction::Stop)
            .await
    }

    fn is_capturing(&self) -> bool {
        self.task.is_some()
    }

    fn name(&self) -> &str {
        "nats-stt"
    }
}

impl Drop for NatsCapture {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Speech narration through a TTS service on NATS request/reply
pub struct NatsNarrator {
    client: NatsClient,
}

impl NatsNarrator {
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl SpeechNarrator for NatsNarrator {
    async fn speak(&self, text: &str) -> Result<()> {
        let reply = self.client.request_speech(text).await?;

        match reply.error {
            Some(error) => anyhow::bail!("TTS service reported: {}", error),
            None => Ok(()),
        }
    }

    async fn cancel(&self) -> Result<()> {
        self.client.publish_speech_cancel().await
    }

    fn name(&self) -> &str {
        "nats-tts"
    }
}

/// Connects a NATS client per session and wraps it as capture + narration
pub struct NatsSpeechFactory {
    url: String,
}

impl NatsSpeechFactory {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait::async_trait]
impl SpeechDeviceFactory for NatsSpeechFactory {
    async fn create(&self, session_id: &str) -> Result<SpeechDevices> {
        let client = NatsClient::connect(&self.url, session_id.to_string()).await?;

        Ok(SpeechDevices {
            capture: Box::new(NatsCapture::new(client.clone())),
            narrator: Arc::new(NatsNarrator::new(client)),
        })
    }
}
