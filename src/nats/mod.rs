pub mod client;
pub mod messages;

pub use client::NatsClient;
pub use messages::{
    CaptureAction, CaptureControlMessage, SpeakReply, SpeakRequest, SpeechCancelMessage,
    TranscriptMessage,
};
