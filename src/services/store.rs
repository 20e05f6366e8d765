use super::models::TranscriptRecord;
use super::TranscriptStore;
use crate::session::is_valid_session_id;
use anyhow::{ensure, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes one pretty-printed JSON file per finished interview
pub struct JsonTranscriptStore {
    dir: PathBuf,
}

impl JsonTranscriptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        // Create output directory if it doesn't exist
        fs::create_dir_all(&dir).context("Failed to create transcripts directory")?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: &str) -> Result<PathBuf> {
        ensure!(
            is_valid_session_id(session_id),
            "Refusing transcript path for session id {:?}",
            session_id
        );
        Ok(self.dir.join(format!("{}.json", session_id)))
    }

    pub async fn load(&self, session_id: &str) -> Result<TranscriptRecord> {
        let path = self.path_for(session_id)?;
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        serde_json::from_slice(&bytes).context("Failed to parse transcript record")
    }
}

#[async_trait::async_trait]
impl TranscriptStore for JsonTranscriptStore {
    async fn save(&self, record: &TranscriptRecord) -> Result<()> {
        let path = self.path_for(&record.session_id)?;
        let bytes = serde_json::to_vec_pretty(record)?;

        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!("Transcript saved: {}", path.display());
        Ok(())
    }
}
