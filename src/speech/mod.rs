pub mod capture;
pub mod narration;
pub mod nats;

pub use capture::{CaptureEvent, CaptureNotice, CaptureSink, SpeechCapture};
pub use narration::SpeechNarrator;
pub use nats::{NatsCapture, NatsNarrator, NatsSpeechFactory};

use anyhow::Result;
use std::sync::Arc;

/// The devices a single session owns for its lifetime
pub struct SpeechDevices {
    pub capture: Box<dyn SpeechCapture>,
    pub narrator: Arc<dyn SpeechNarrator>,
}

/// Creates a fresh pair of speech devices for each session
#[async_trait::async_trait]
pub trait SpeechDeviceFactory: Send + Sync {
    async fn create(&self, session_id: &str) -> Result<SpeechDevices>;
}
