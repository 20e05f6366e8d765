use anyhow::Result;
use tokio::sync::mpsc;

/// Signals a speech-to-text device reports about one capture run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    Started,
    Ended,
    Error(String),
    Fragment { text: String, is_final: bool },
}

/// A capture event tagged with the run that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureNotice {
    pub run: u64,
    pub event: CaptureEvent,
}

/// Where a capture device delivers its callbacks
///
/// Every `start` gets a fresh sink carrying a new run id, so events from a
/// run that has since been stopped or restarted can be recognised and dropped.
#[derive(Debug, Clone)]
pub struct CaptureSink {
    run: u64,
    tx: mpsc::UnboundedSender<CaptureNotice>,
}

impl CaptureSink {
    pub fn new(run: u64, tx: mpsc::UnboundedSender<CaptureNotice>) -> Self {
        Self { run, tx }
    }

    pub fn run(&self) -> u64 {
        self.run
    }

    pub fn started(&self) {
        self.emit(CaptureEvent::Started);
    }

    pub fn ended(&self) {
        self.emit(CaptureEvent::Ended);
    }

    pub fn error(&self, reason: impl Into<String>) {
        self.emit(CaptureEvent::Error(reason.into()));
    }

    pub fn fragment(&self, text: impl Into<String>, is_final: bool) {
        self.emit(CaptureEvent::Fragment {
            text: text.into(),
            is_final,
        });
    }

    /// True once the session that handed out this sink has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn emit(&self, event: CaptureEvent) {
        // The session may already be gone; nothing left to tell
        let _ = self.tx.send(CaptureNotice {
            run: self.run,
            event,
        });
    }
}

/// Continuous speech-to-text device
///
/// Implementations:
/// - NATS: transcripts from an STT service on `stt.text.>`
/// - Test fakes emitting scripted event sequences
#[async_trait::async_trait]
pub trait SpeechCapture: Send + Sync {
    /// Begin a capture run; events for it go to `sink`
    async fn start(&mut self, sink: CaptureSink) -> Result<()>;

    /// Stop the current run. Must tolerate being called while idle.
    async fn stop(&mut self) -> Result<()>;

    /// Check if the device is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get device name for logging
    fn name(&self) -> &str;
}
