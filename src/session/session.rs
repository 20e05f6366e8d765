use super::clock::Clock;
use super::config::SessionConfig;
use super::handle::{Command, InterviewHandle};
use super::machine::{Effect, MachineSettings, SessionEvent, SessionMachine};
use super::publisher::{AssessmentStatus, ResultPublisher};
use super::snapshot::SessionSnapshot;
use super::state::{Question, SessionTranscript};
use crate::error::InterviewError;
use crate::services::{InterviewServices, QuestionSource, ResumeSource, Scorecard, TranscriptRecord};
use crate::speech::{
    CaptureEvent, CaptureNotice, CaptureSink, SpeechCapture, SpeechDevices, SpeechNarrator,
};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Start an interview: fetch questions, then run the session until it ends
///
/// The session runs on its own task, which exclusively owns the capture and
/// narration devices. Callers drive it through the returned handle; once
/// every handle is dropped the session ends itself.
pub fn start_session(
    config: SessionConfig,
    services: InterviewServices,
    devices: SpeechDevices,
) -> Result<InterviewHandle, InterviewError> {
    config.validate()?;

    info!(
        "Starting interview session: {} (resume {}, {} minutes)",
        config.session_id, config.resume_id, config.duration_minutes
    );

    let machine = SessionMachine::new(MachineSettings {
        duration_minutes: config.duration_minutes,
        settle_delay: config.settle_delay,
        default_question_seconds: config.default_question_seconds,
    });

    let (commands_tx, commands_rx) = mpsc::channel(32);
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (capture_tx, capture_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::capture(
        &config.session_id,
        &machine,
        &AssessmentStatus::NotSubmitted,
    ));

    let fetch_task = spawn_question_fetch(&config, &services, events_tx.clone());

    let runner = SessionRunner {
        clock: Clock::new(config.tick_period),
        publisher: ResultPublisher::new(services.assessor, services.store),
        machine,
        capture: devices.capture,
        narrator: devices.narrator,
        commands: commands_rx,
        events_tx,
        events: events_rx,
        capture_tx,
        capture_notices: capture_rx,
        snapshot: snapshot_tx,
        narration_task: None,
        fetch_task: Some(fetch_task),
        config: config.clone(),
    };
    tokio::spawn(runner.run());

    Ok(InterviewHandle::new(config.session_id, commands_tx, snapshot_rx))
}

fn spawn_question_fetch(
    config: &SessionConfig,
    services: &InterviewServices,
    tx: mpsc::UnboundedSender<SessionEvent>,
) -> JoinHandle<()> {
    let resumes = Arc::clone(&services.resumes);
    let questions = Arc::clone(&services.questions);
    let user_id = config.user_id.clone();
    let resume_id = config.resume_id.clone();
    let duration_minutes = config.duration_minutes;

    tokio::spawn(async move {
        let event = match fetch_questions(
            resumes.as_ref(),
            questions.as_ref(),
            &user_id,
            &resume_id,
            duration_minutes,
        )
        .await
        {
            Ok(questions) => SessionEvent::QuestionsLoaded(questions),
            Err(e) => SessionEvent::LoadFailed(format!("{:#}", e)),
        };
        let _ = tx.send(event);
    })
}

async fn fetch_questions(
    resumes: &dyn ResumeSource,
    questions: &dyn QuestionSource,
    user_id: &str,
    resume_id: &str,
    duration_minutes: u32,
) -> Result<Vec<Question>> {
    let resume_text = resumes
        .resume_text(user_id, resume_id)
        .await
        .context("Failed to load resume")?;

    questions
        .generate_questions(&resume_text, duration_minutes)
        .await
        .context("Failed to generate questions")
}

enum Next {
    Command(Option<Command>),
    Event(SessionEvent),
    Capture(CaptureNotice),
    Assessed(Result<Scorecard, String>),
}

/// The single actor that owns a session's state and devices
struct SessionRunner {
    config: SessionConfig,
    machine: SessionMachine,
    capture: Box<dyn SpeechCapture>,
    narrator: Arc<dyn SpeechNarrator>,
    clock: Clock,
    publisher: ResultPublisher,

    commands: mpsc::Receiver<Command>,

    /// Clock ticks, narration completions, settle timers, question fetch
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events: mpsc::UnboundedReceiver<SessionEvent>,

    capture_tx: mpsc::UnboundedSender<CaptureNotice>,
    capture_notices: mpsc::UnboundedReceiver<CaptureNotice>,

    snapshot: watch::Sender<SessionSnapshot>,

    narration_task: Option<JoinHandle<()>>,
    fetch_task: Option<JoinHandle<()>>,
}

impl SessionRunner {
    async fn run(mut self) {
        let mut commands_open = true;

        loop {
            let next = tokio::select! {
                command = self.commands.recv(), if commands_open => Next::Command(command),
                Some(event) = self.events.recv() => Next::Event(event),
                Some(notice) = self.capture_notices.recv() => Next::Capture(notice),
                outcome = self.publisher.outcome(), if self.publisher.is_pending() => Next::Assessed(outcome),
            };

            match next {
                Next::Command(Some(command)) => self.dispatch(command.into()).await,
                Next::Command(None) => {
                    info!("All handles to {} dropped; ending session", self.config.session_id);
                    commands_open = false;
                    self.dispatch(SessionEvent::EndRequested).await;
                }
                Next::Event(event) => self.dispatch(event).await,
                Next::Capture(CaptureNotice { run, event }) => {
                    self.dispatch(SessionEvent::Capture { run, event }).await
                }
                Next::Assessed(outcome) => self.publisher.complete(outcome),
            }

            self.publish_snapshot();

            if self.machine.session().is_ended() && (self.publisher.is_settled() || !commands_open) {
                break;
            }
        }

        self.shutdown().await;
    }

    async fn dispatch(&mut self, event: SessionEvent) {
        for effect in self.machine.apply(event) {
            self.execute(effect).await;
        }
    }

    async fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::StartClock => self.clock.start(self.events_tx.clone()),
            Effect::StopClock => self.clock.stop(),
            Effect::StartCapture { run } => {
                let sink = CaptureSink::new(run, self.capture_tx.clone());
                if let Err(e) = self.capture.start(sink).await {
                    warn!("{} failed to start: {:#}", self.capture.name(), e);
                    let _ = self.capture_tx.send(CaptureNotice {
                        run,
                        event: CaptureEvent::Error(format!("{:#}", e)),
                    });
                }
            }
            Effect::StopCapture => {
                if let Err(e) = self.capture.stop().await {
                    warn!("{} failed to stop: {:#}", self.capture.name(), e);
                }
            }
            Effect::Speak { utterance, text } => self.speak(utterance, text),
            Effect::CancelNarration => {
                if let Some(task) = self.narration_task.take() {
                    task.abort();
                }
                if let Err(e) = self.narrator.cancel().await {
                    warn!("{} failed to cancel: {:#}", self.narrator.name(), e);
                }
            }
            Effect::ScheduleSettle {
                question_index,
                delay,
            } => {
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(SessionEvent::CaptureSettled { question_index });
                });
            }
            Effect::Finished(transcript) => self.finish(transcript),
        }
    }

    fn speak(&mut self, utterance: u64, text: String) {
        let narrator = Arc::clone(&self.narrator);
        let tx = self.events_tx.clone();
        let limit = self.config.narration_timeout;

        self.narration_task = Some(tokio::spawn(async move {
            let outcome = match timeout(limit, narrator.speak(&text)).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(format!("{:#}", e)),
                Err(_) => Err(format!("narration timed out after {:?}", limit)),
            };
            let _ = tx.send(SessionEvent::NarrationFinished { utterance, outcome });
        }));
    }

    fn finish(&mut self, transcript: SessionTranscript) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }

        let summary = transcript.summary();
        for (index, qa) in transcript.answers.iter().enumerate() {
            info!("Q{}: {}", index + 1, qa.question);
            info!("A{}: {}", index + 1, qa.answer);
        }

        let record = TranscriptRecord {
            session_id: self.config.session_id.clone(),
            resume_id: self.config.resume_id.clone(),
            user_id: self.config.user_id.clone(),
            qa: transcript.answers,
            summary,
            end_reason: transcript.end_reason,
            scorecard: None,
            created_at: Utc::now(),
        };
        self.publisher.submit(record);
    }

    fn publish_snapshot(&self) {
        self.snapshot.send_replace(SessionSnapshot::capture(
            &self.config.session_id,
            &self.machine,
            self.publisher.status(),
        ));
    }

    async fn shutdown(&mut self) {
        self.clock.stop();

        if self.capture.is_capturing() {
            if let Err(e) = self.capture.stop().await {
                error!("Failed to release {}: {:#}", self.capture.name(), e);
            }
        }
        if let Some(task) = self.narration_task.take() {
            task.abort();
        }
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }

        info!("Interview session {} released", self.config.session_id);
    }
}
