//! Interview session state machine
//!
//! A reducer over `(Session, SessionEvent) -> Vec<Effect>`. It never touches a
//! device or a timer itself: the runner feeds it one event at a time and
//! carries out the effects it returns, in order.

use super::state::{
    normalize_questions, EndReason, Phase, QaEntry, Question, Session, SessionTranscript, NO_ANSWER,
};
use crate::speech::CaptureEvent;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Capture failures tolerated per question before giving up on capture
const MAX_CAPTURE_FAILURES: u8 = 2;

/// Everything that can happen to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    QuestionsLoaded(Vec<Question>),
    LoadFailed(String),
    /// One elapsed second; `seq` increases monotonically per clock
    Tick { seq: u64 },
    Capture { run: u64, event: CaptureEvent },
    NarrationFinished {
        utterance: u64,
        outcome: Result<(), String>,
    },
    /// Settle delay after narration for `question_index` has elapsed
    CaptureSettled { question_index: usize },
    /// Manual skip, issued while `from_index` was the current question
    AdvanceRequested { from_index: usize },
    MicrophoneToggled(bool),
    EndRequested,
}

/// Work the runner must carry out on the machine's behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartClock,
    StopClock,
    StartCapture { run: u64 },
    StopCapture,
    Speak { utterance: u64, text: String },
    CancelNarration,
    ScheduleSettle {
        question_index: usize,
        delay: Duration,
    },
    Finished(SessionTranscript),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    /// Start requested, device has not confirmed yet
    Starting,
    Active,
}

#[derive(Debug)]
struct CaptureLink {
    state: CaptureState,
    run: u64,
    failures: u8,
    exhausted: bool,
    microphone: bool,
    /// Settle delay after the current question's narration has elapsed
    settled: bool,
}

#[derive(Debug, Clone)]
pub struct MachineSettings {
    pub duration_minutes: u32,
    pub settle_delay: Duration,
    pub default_question_seconds: u32,
}

#[derive(Debug)]
pub struct SessionMachine {
    session: Session,
    settle_delay: Duration,
    default_question_seconds: u32,
    capture: CaptureLink,
    narration: Option<u64>,
    next_utterance: u64,
    last_tick: Option<u64>,
    clock_running: bool,
}

impl SessionMachine {
    pub fn new(settings: MachineSettings) -> Self {
        Self {
            session: Session::new(settings.duration_minutes),
            settle_delay: settings.settle_delay,
            default_question_seconds: settings.default_question_seconds,
            capture: CaptureLink {
                state: CaptureState::Idle,
                run: 0,
                failures: 0,
                exhausted: false,
                microphone: true,
                settled: false,
            },
            narration: None,
            next_utterance: 0,
            last_tick: None,
            clock_running: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture.state
    }

    /// Capture gave up for the current question
    pub fn capture_exhausted(&self) -> bool {
        self.capture.exhausted
    }

    pub fn is_narrating(&self) -> bool {
        self.narration.is_some()
    }

    pub fn microphone_enabled(&self) -> bool {
        self.capture.microphone
    }

    /// Apply one event to completion
    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            SessionEvent::QuestionsLoaded(questions) => {
                self.on_questions_loaded(questions, &mut effects)
            }
            SessionEvent::LoadFailed(reason) => self.on_load_failed(reason, &mut effects),
            SessionEvent::Tick { seq } => self.on_tick(seq, &mut effects),
            SessionEvent::Capture { run, event } => self.on_capture(run, event, &mut effects),
            SessionEvent::NarrationFinished { utterance, outcome } => {
                self.on_narration_finished(utterance, outcome, &mut effects)
            }
            SessionEvent::CaptureSettled { question_index } => {
                if self.session.phase == Phase::Listening
                    && question_index == self.session.current_index
                {
                    self.capture.settled = true;
                    self.start_capture(&mut effects);
                } else {
                    debug!("Dropping stale settle timer for question {}", question_index + 1);
                }
            }
            SessionEvent::AdvanceRequested { from_index } => {
                self.on_advance_requested(from_index, &mut effects)
            }
            SessionEvent::MicrophoneToggled(enabled) => {
                self.on_microphone_toggled(enabled, &mut effects)
            }
            SessionEvent::EndRequested => self.end(EndReason::EndedByCaller, &mut effects),
        }

        effects
    }

    fn on_questions_loaded(&mut self, questions: Vec<Question>, effects: &mut Vec<Effect>) {
        if self.session.phase != Phase::Loading {
            debug!("Dropping question list: session is no longer loading");
            return;
        }

        let questions = normalize_questions(questions, self.default_question_seconds);
        if questions.is_empty() {
            self.on_load_failed("question service returned no questions".to_string(), effects);
            return;
        }

        info!("Loaded {} interview questions", questions.len());
        self.session.questions = questions;

        effects.push(Effect::StartClock);
        self.clock_running = true;

        self.begin_question(0, effects);
    }

    fn on_load_failed(&mut self, reason: String, effects: &mut Vec<Effect>) {
        if self.session.phase != Phase::Loading {
            return;
        }
        warn!("Cannot start interview: {}", reason);
        self.end(EndReason::SetupFailed(reason), effects);
    }

    fn begin_question(&mut self, index: usize, effects: &mut Vec<Effect>) {
        let question = self.session.questions[index].clone();

        self.session.current_index = index;
        self.session.per_question_remaining_seconds = question.allocated_seconds;
        self.session.current_answer_buffer.clear();
        self.session.interim_fragment.clear();
        self.capture.failures = 0;
        self.capture.exhausted = false;
        self.capture.settled = false;

        info!(
            "Question {}/{} ({}s): {}",
            index + 1,
            self.session.questions.len(),
            question.allocated_seconds,
            question.text
        );

        self.narrate(question.text, effects);
    }

    fn narrate(&mut self, text: String, effects: &mut Vec<Effect>) {
        self.session.phase = Phase::Narrating;
        self.stop_capture(effects);

        if let Some(in_flight) = self.narration {
            warn!("Narration {} still in flight; rejecting new utterance", in_flight);
            return;
        }

        self.next_utterance += 1;
        self.narration = Some(self.next_utterance);
        effects.push(Effect::Speak {
            utterance: self.next_utterance,
            text,
        });
    }

    fn on_narration_finished(
        &mut self,
        utterance: u64,
        outcome: Result<(), String>,
        effects: &mut Vec<Effect>,
    ) {
        if self.narration != Some(utterance) {
            debug!("Dropping completion of stale utterance {}", utterance);
            return;
        }
        self.narration = None;

        if self.session.phase != Phase::Narrating {
            return;
        }

        if let Err(reason) = outcome {
            // The narrator may still be playing; silence it before capture re-arms
            warn!("Narration failed ({}); continuing as if it finished", reason);
            effects.push(Effect::CancelNarration);
        }

        self.session.phase = Phase::Listening;
        if let Some(question) = self.session.current_question() {
            self.session.per_question_remaining_seconds = question.allocated_seconds;
        }

        effects.push(Effect::ScheduleSettle {
            question_index: self.session.current_index,
            delay: self.settle_delay,
        });
    }

    fn start_capture(&mut self, effects: &mut Vec<Effect>) {
        if self.session.phase != Phase::Listening || self.narration.is_some() {
            return;
        }
        if !self.capture.microphone || self.capture.exhausted || !self.capture.settled {
            return;
        }
        if self.capture.state != CaptureState::Idle {
            debug!("Capture run {} already {:?}", self.capture.run, self.capture.state);
            return;
        }

        self.capture.run += 1;
        self.capture.state = CaptureState::Starting;
        effects.push(Effect::StartCapture {
            run: self.capture.run,
        });
    }

    fn stop_capture(&mut self, effects: &mut Vec<Effect>) {
        if self.capture.state != CaptureState::Idle {
            self.capture.state = CaptureState::Idle;
            effects.push(Effect::StopCapture);
        }
    }

    fn on_capture(&mut self, run: u64, event: CaptureEvent, effects: &mut Vec<Effect>) {
        if run != self.capture.run || self.session.is_ended() {
            debug!("Dropping {:?} from capture run {}", event, run);
            return;
        }

        match event {
            CaptureEvent::Started => {
                if self.capture.state == CaptureState::Starting {
                    self.capture.state = CaptureState::Active;
                }
            }
            CaptureEvent::Fragment { text, is_final } => {
                if self.capture.state == CaptureState::Idle || self.session.phase != Phase::Listening
                {
                    debug!("Dropping fragment outside of listening");
                    return;
                }
                self.capture.state = CaptureState::Active;

                if is_final {
                    self.session.append_final_fragment(&text);
                    self.session.interim_fragment.clear();
                    self.capture.failures = 0;
                } else {
                    self.session.interim_fragment = text.trim().to_string();
                }
            }
            CaptureEvent::Ended => {
                if self.capture.state != CaptureState::Idle {
                    self.capture.state = CaptureState::Idle;
                    self.capture_failed("capture ended unexpectedly", effects);
                }
            }
            CaptureEvent::Error(reason) => {
                if self.capture.state != CaptureState::Idle {
                    self.capture.state = CaptureState::Idle;
                    self.capture_failed(&reason, effects);
                }
            }
        }
    }

    fn capture_failed(&mut self, reason: &str, effects: &mut Vec<Effect>) {
        if self.session.phase != Phase::Listening {
            return;
        }

        self.capture.failures += 1;
        if self.capture.failures < MAX_CAPTURE_FAILURES {
            warn!("Capture failed ({}); restarting", reason);
            self.start_capture(effects);
        } else {
            warn!(
                "Capture failed again ({}); question {} continues on its timer",
                reason,
                self.session.current_index + 1
            );
            self.capture.exhausted = true;
        }
    }

    fn on_tick(&mut self, seq: u64, effects: &mut Vec<Effect>) {
        if matches!(self.last_tick, Some(last) if seq <= last) {
            debug!("Dropping stale tick {}", seq);
            return;
        }
        self.last_tick = Some(seq);

        if matches!(self.session.phase, Phase::Loading | Phase::Ended) {
            return;
        }

        self.session.overall_remaining_seconds =
            self.session.overall_remaining_seconds.saturating_sub(1);
        if self.session.overall_remaining_seconds == 0 {
            info!("Interview time is up");
            self.end(EndReason::OverallTimeout, effects);
            return;
        }

        if self.session.phase == Phase::Listening {
            self.session.per_question_remaining_seconds =
                self.session.per_question_remaining_seconds.saturating_sub(1);
            if self.session.per_question_remaining_seconds == 0 {
                info!("Time is up for question {}", self.session.current_index + 1);
                self.advance(effects);
            }
        }
    }

    fn on_advance_requested(&mut self, from_index: usize, effects: &mut Vec<Effect>) {
        if self.session.phase != Phase::Listening || from_index != self.session.current_index {
            debug!(
                "Ignoring skip issued for question {} (current {}, {:?})",
                from_index + 1,
                self.session.current_index + 1,
                self.session.phase
            );
            return;
        }
        self.advance(effects);
    }

    fn advance(&mut self, effects: &mut Vec<Effect>) {
        self.session.phase = Phase::Advancing;
        self.stop_capture(effects);

        let question = self.session.questions[self.session.current_index].text.clone();
        let answer = match self.session.current_answer_buffer.trim() {
            "" => NO_ANSWER.to_string(),
            text => text.to_string(),
        };
        self.session.answers.push(QaEntry { question, answer });
        self.session.current_index += 1;
        self.session.current_answer_buffer.clear();
        self.session.interim_fragment.clear();

        if self.session.current_index == self.session.questions.len() {
            self.end(EndReason::Completed, effects);
        } else {
            self.begin_question(self.session.current_index, effects);
        }
    }

    fn on_microphone_toggled(&mut self, enabled: bool, effects: &mut Vec<Effect>) {
        if self.session.is_ended() || self.capture.microphone == enabled {
            return;
        }

        info!("Microphone {}", if enabled { "enabled" } else { "muted" });
        self.capture.microphone = enabled;

        if enabled {
            self.capture.failures = 0;
            self.capture.exhausted = false;
            self.start_capture(effects);
        } else {
            self.stop_capture(effects);
        }
    }

    fn end(&mut self, reason: EndReason, effects: &mut Vec<Effect>) {
        if self.session.is_ended() {
            return;
        }

        if self.clock_running {
            self.clock_running = false;
            effects.push(Effect::StopClock);
        }
        self.stop_capture(effects);
        if self.narration.take().is_some() {
            effects.push(Effect::CancelNarration);
        }

        // An answer in progress is kept only if something was said
        let pending = self.session.current_answer_buffer.trim().to_string();
        if !pending.is_empty() {
            if let Some(question) = self.session.current_question() {
                let question = question.text.clone();
                self.session.answers.push(QaEntry {
                    question,
                    answer: pending,
                });
            }
        }
        self.session.current_answer_buffer.clear();
        self.session.interim_fragment.clear();

        self.session.phase = Phase::Ended;
        self.session.end_reason = Some(reason.clone());

        let summary = self.session.summary();
        info!(
            "Interview ended ({:?}): {}/{} questions answered ({}%)",
            reason, summary.questions_answered, summary.total_questions, summary.completion_rate
        );

        effects.push(Effect::Finished(SessionTranscript {
            questions: self.session.questions.clone(),
            answers: self.session.answers.clone(),
            end_reason: reason,
        }));
    }
}
