use super::machine::SessionEvent;
use super::snapshot::SessionSnapshot;
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// Requests a caller can make of a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Advance { from_index: usize },
    End,
    Microphone(bool),
}

impl From<Command> for SessionEvent {
    fn from(command: Command) -> Self {
        match command {
            Command::Advance { from_index } => SessionEvent::AdvanceRequested { from_index },
            Command::End => SessionEvent::EndRequested,
            Command::Microphone(enabled) => SessionEvent::MicrophoneToggled(enabled),
        }
    }
}

/// Caller-side handle to a running interview session
#[derive(Clone)]
pub struct InterviewHandle {
    session_id: String,
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl InterviewHandle {
    pub(crate) fn new(
        session_id: String,
        commands: mpsc::Sender<Command>,
        snapshot: watch::Receiver<SessionSnapshot>,
    ) -> Self {
        Self {
            session_id,
            commands,
            snapshot,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// True if both handles drive the same running session
    pub fn is_same_session(&self, other: &InterviewHandle) -> bool {
        self.commands.same_channel(&other.commands)
    }

    /// Latest published state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Close the current question now. Issued against the question currently
    /// shown, so a repeated request cannot skip the following one.
    pub async fn advance_to_next_question(&self) {
        let from_index = self.snapshot.borrow().current_index;
        self.send(Command::Advance { from_index }).await;
    }

    /// End the interview from any state; repeated calls are no-ops
    pub async fn end_session(&self) {
        self.send(Command::End).await;
    }

    pub async fn set_microphone(&self, enabled: bool) {
        self.send(Command::Microphone(enabled)).await;
    }

    /// Wait until a snapshot satisfies `condition`, or the session is gone
    pub async fn wait_for<F>(&self, mut condition: F) -> SessionSnapshot
    where
        F: FnMut(&SessionSnapshot) -> bool,
    {
        let mut rx = self.snapshot.clone();
        loop {
            {
                let current = rx.borrow_and_update();
                if condition(&*current) {
                    return current.clone();
                }
            }
            if rx.changed().await.is_err() {
                return rx.borrow().clone();
            }
        }
    }

    /// Wait for the session to end and its assessment to settle
    pub async fn wait_until_finished(&self) -> SessionSnapshot {
        self.wait_for(SessionSnapshot::is_finished).await
    }

    async fn send(&self, command: Command) {
        if self.commands.send(command).await.is_err() {
            debug!("Session {} already released; {:?} ignored", self.session_id, command);
        }
    }
}
