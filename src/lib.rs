pub mod config;
pub mod error;
pub mod http;
pub mod nats;
pub mod services;
pub mod session;
pub mod speech;

pub use config::Config;
pub use error::InterviewError;
pub use http::{create_router, AppState};
pub use nats::{NatsClient, TranscriptMessage};
pub use services::{
    Assessor, BackendClient, InterviewServices, JsonTranscriptStore, QuestionSource,
    ResumeSource, Scorecard, TranscriptRecord, TranscriptStore,
};
pub use session::{
    start_session, AssessmentStatus, EndReason, InterviewHandle, Phase, QaEntry, Question,
    SessionConfig, SessionSnapshot,
};
pub use speech::{
    CaptureEvent, CaptureSink, NatsSpeechFactory, SpeechCapture, SpeechDeviceFactory,
    SpeechDevices, SpeechNarrator,
};
