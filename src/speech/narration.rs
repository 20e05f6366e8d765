use anyhow::Result;

/// Text-to-speech device
///
/// Only one utterance is active at a time; the session never asks for a new
/// one before the previous `speak` has resolved or been cancelled.
#[async_trait::async_trait]
pub trait SpeechNarrator: Send + Sync {
    /// Speak `text`, resolving once playback has finished
    async fn speak(&self, text: &str) -> Result<()>;

    /// Stop playback. Must tolerate being called while idle.
    async fn cancel(&self) -> Result<()>;

    /// Get device name for logging
    fn name(&self) -> &str;
}
