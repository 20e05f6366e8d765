use crate::config::InterviewConfig;
use crate::services::InterviewServices;
use crate::session::InterviewHandle;
use crate::speech::SpeechDeviceFactory;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

/// A registry slot
#[derive(Clone)]
pub enum SessionEntry {
    /// Id reserved while devices are created and questions fetched
    Starting,
    Active(InterviewHandle),
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Interview sessions (session_id → entry)
    pub sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,

    /// Collaborators every session talks to
    pub services: InterviewServices,

    /// Speech devices for new sessions
    pub devices: Arc<dyn SpeechDeviceFactory>,

    pub interview: Arc<InterviewConfig>,
}

impl AppState {
    pub fn new(
        services: InterviewServices,
        devices: Arc<dyn SpeechDeviceFactory>,
        interview: InterviewConfig,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            services,
            devices,
            interview: Arc::new(interview),
        }
    }

    /// Claim `session_id`; false if it is already taken
    pub async fn reserve(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(session_id) {
            return false;
        }
        sessions.insert(session_id.to_string(), SessionEntry::Starting);
        true
    }

    /// Drop a reservation that never became a session
    pub async fn unreserve(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        if matches!(sessions.get(session_id), Some(SessionEntry::Starting)) {
            sessions.remove(session_id);
        }
    }

    /// Register a started session and schedule its removal once it has
    /// finished and `retention` has passed
    pub async fn activate(&self, handle: InterviewHandle, retention: Duration) {
        let session_id = handle.session_id().to_string();
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), SessionEntry::Active(handle.clone()));

        let sessions = Arc::clone(&self.sessions);
        tokio::spawn(async move {
            handle.wait_until_finished().await;
            tokio::time::sleep(retention).await;

            let mut sessions = sessions.write().await;
            let same = matches!(
                sessions.get(&session_id),
                Some(SessionEntry::Active(current)) if current.is_same_session(&handle)
            );
            if same {
                sessions.remove(&session_id);
                info!("Interview {} expired", session_id);
            }
        });
    }
}
