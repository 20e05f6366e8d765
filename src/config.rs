use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub nats: NatsConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub interview: InterviewConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct NatsConfig {
    pub url: String,
}

/// Resume, question generation and assessment services
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    /// Pause between the end of narration and re-arming capture
    pub settle_delay_ms: u64,
    pub narration_timeout_secs: u64,
    /// Budget for generated questions that come back without one
    pub default_question_seconds: u32,
    pub max_duration_minutes: u32,
    /// How long a finished session stays queryable over HTTP
    pub retention_secs: u64,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1000,
            narration_timeout_secs: 30,
            default_question_seconds: 60,
            max_duration_minutes: 120,
            retention_secs: 300,
        }
    }
}

impl InterviewConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn narration_timeout(&self) -> Duration {
        Duration::from_secs(self.narration_timeout_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub transcripts_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            transcripts_path: "data/transcripts".to_string(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Config {
    /// Load from a config file, with `MOCK_INTERVIEW__SECTION__KEY` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("MOCK_INTERVIEW").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
