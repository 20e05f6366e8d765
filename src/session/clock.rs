use super::machine::SessionEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// One-second tick source shared by both interview countdowns
pub struct Clock {
    period: Duration,
    /// Sequence numbers keep increasing across restarts
    seq: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl Clock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            seq: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Arm the clock; the first tick fires one period from now
    pub fn start(&mut self, tx: mpsc::UnboundedSender<SessionEvent>) {
        if self.is_running() {
            return;
        }

        let period = self.period;
        let seq = Arc::clone(&self.seq);

        self.task = Some(tokio::spawn(async move {
            let mut cadence = interval_at(Instant::now() + period, period);
            cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                cadence.tick().await;
                let seq = seq.fetch_add(1, Ordering::SeqCst) + 1;
                if tx.send(SessionEvent::Tick { seq }).is_err() {
                    debug!("Clock receiver gone");
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.stop();
    }
}
