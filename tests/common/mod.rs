//! Scripted speech devices and in-memory services for session tests

#![allow(dead_code)]

use anyhow::{bail, Result};
use mock_interview::services::AssessmentRequest;
use mock_interview::{
    Assessor, CaptureSink, InterviewServices, Question, QuestionSource, ResumeSource, Scorecard,
    SessionConfig, SpeechCapture, SpeechDeviceFactory, SpeechDevices, SpeechNarrator,
    TranscriptRecord, TranscriptStore,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Off the tick boundary so completion never races a clock tick
pub const NARRATION: Duration = Duration::from_millis(2500);

/// How the fake capture device behaves on one `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureScript {
    /// Confirms and then stays silent until spoken to
    Listen,
    /// Confirms, then fails and closes
    Fail,
}

/// How the fake narrator handles every utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationMode {
    Speaks,
    Fails,
    /// Never reports completion
    Hangs,
}

#[derive(Default)]
struct ProbeState {
    starts: usize,
    stops: usize,
    active: bool,
    sink: Option<CaptureSink>,
    script: VecDeque<CaptureScript>,
    spoken: Vec<String>,
    cancels: usize,
    spoke_while_capturing: bool,
}

/// Shared view into the fake devices
#[derive(Clone, Default)]
pub struct DeviceProbe {
    inner: Arc<Mutex<ProbeState>>,
}

impl DeviceProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behaviours for the next starts, in order; later starts just listen
    pub fn script(&self, steps: impl IntoIterator<Item = CaptureScript>) {
        self.inner.lock().unwrap().script.extend(steps);
    }

    /// Deliver a recognised fragment on the current capture run
    pub fn say(&self, text: &str, is_final: bool) {
        let state = self.inner.lock().unwrap();
        let sink = state.sink.as_ref().expect("capture was never started");
        sink.fragment(text, is_final);
    }

    pub fn starts(&self) -> usize {
        self.inner.lock().unwrap().starts
    }

    pub fn stops(&self) -> usize {
        self.inner.lock().unwrap().stops
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock().unwrap().active
    }

    pub fn spoken(&self) -> Vec<String> {
        self.inner.lock().unwrap().spoken.clone()
    }

    pub fn cancels(&self) -> usize {
        self.inner.lock().unwrap().cancels
    }

    pub fn spoke_while_capturing(&self) -> bool {
        self.inner.lock().unwrap().spoke_while_capturing
    }

    pub fn devices(&self) -> SpeechDevices {
        self.devices_with(NarrationMode::Speaks)
    }

    pub fn devices_with(&self, mode: NarrationMode) -> SpeechDevices {
        SpeechDevices {
            capture: Box::new(FakeCapture {
                probe: self.clone(),
            }),
            narrator: Arc::new(FakeNarrator {
                probe: self.clone(),
                mode,
            }),
        }
    }
}

pub struct FakeCapture {
    probe: DeviceProbe,
}

#[async_trait::async_trait]
impl SpeechCapture for FakeCapture {
    async fn start(&mut self, sink: CaptureSink) -> Result<()> {
        let mut state = self.probe.inner.lock().unwrap();
        state.starts += 1;
        state.active = true;
        sink.started();

        if state.script.pop_front() == Some(CaptureScript::Fail) {
            state.active = false;
            sink.error("recognizer network error");
            sink.ended();
        }
        state.sink = Some(sink);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        let mut state = self.probe.inner.lock().unwrap();
        state.stops += 1;
        state.active = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.probe.is_active()
    }

    fn name(&self) -> &str {
        "fake-capture"
    }
}

pub struct FakeNarrator {
    probe: DeviceProbe,
    mode: NarrationMode,
}

#[async_trait::async_trait]
impl SpeechNarrator for FakeNarrator {
    async fn speak(&self, text: &str) -> Result<()> {
        {
            let mut state = self.probe.inner.lock().unwrap();
            if state.active {
                state.spoke_while_capturing = true;
            }
            state.spoken.push(text.to_string());
        }
        match self.mode {
            NarrationMode::Speaks => tokio::time::sleep(NARRATION).await,
            NarrationMode::Fails => bail!("speech synthesizer unavailable"),
            NarrationMode::Hangs => std::future::pending::<()>().await,
        }
        Ok(())
    }

    async fn cancel(&self) -> Result<()> {
        self.probe.inner.lock().unwrap().cancels += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "fake-narrator"
    }
}

/// Hands out devices backed by one probe
pub struct FakeDeviceFactory {
    pub probe: DeviceProbe,
}

#[async_trait::async_trait]
impl SpeechDeviceFactory for FakeDeviceFactory {
    async fn create(&self, _session_id: &str) -> Result<SpeechDevices> {
        Ok(self.probe.devices())
    }
}

pub struct FakeResumes;

#[async_trait::async_trait]
impl ResumeSource for FakeResumes {
    async fn resume_text(&self, _user_id: &str, resume_id: &str) -> Result<String> {
        if resume_id == "missing" {
            bail!("resume {} not found", resume_id);
        }
        Ok("Rust engineer; built a distributed cache.".to_string())
    }
}

pub struct FakeQuestions {
    pub questions: Vec<Question>,
}

#[async_trait::async_trait]
impl QuestionSource for FakeQuestions {
    async fn generate_questions(
        &self,
        _resume_text: &str,
        _duration_minutes: u32,
    ) -> Result<Vec<Question>> {
        Ok(self.questions.clone())
    }
}

#[derive(Default)]
pub struct FakeAssessor {
    pub fail: bool,
    pub requests: Mutex<Vec<AssessmentRequest>>,
}

#[async_trait::async_trait]
impl Assessor for FakeAssessor {
    async fn assess(&self, request: &AssessmentRequest) -> Result<Scorecard> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            bail!("assessment service returned 503");
        }
        Ok(scorecard(7.5))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub records: Mutex<Vec<TranscriptRecord>>,
}

#[async_trait::async_trait]
impl TranscriptStore for MemoryStore {
    async fn save(&self, record: &TranscriptRecord) -> Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub fn scorecard(score: f64) -> Scorecard {
    Scorecard {
        score,
        clarity: "Clear and structured".to_string(),
        technical: "Good depth on caching".to_string(),
        completeness: "Answered most questions".to_string(),
        professionalism: "Professional".to_string(),
        strengths: "Concrete examples".to_string(),
        weaknesses: "Short answers".to_string(),
        suggestions: "Quantify impact".to_string(),
    }
}

pub fn three_questions() -> Vec<Question> {
    vec![
        Question::new("Tell me about yourself.", 5),
        Question::new("Describe a hard bug you fixed.", 5),
        Question::new("Why this team?", 5),
    ]
}

pub struct Fixture {
    pub services: InterviewServices,
    pub assessor: Arc<FakeAssessor>,
    pub store: Arc<MemoryStore>,
}

pub fn fixture(questions: Vec<Question>, assessment_fails: bool) -> Fixture {
    let assessor = Arc::new(FakeAssessor {
        fail: assessment_fails,
        ..Default::default()
    });
    let store = Arc::new(MemoryStore::default());

    let services = InterviewServices {
        resumes: Arc::new(FakeResumes),
        questions: Arc::new(FakeQuestions { questions }),
        assessor: assessor.clone(),
        store: Some(store.clone()),
    };

    Fixture {
        services,
        assessor,
        store,
    }
}

/// One-minute interview with the default one-second settle delay
pub fn one_minute() -> SessionConfig {
    SessionConfig::new("resume-1", "user-1", 1)
}
