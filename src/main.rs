use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mock_interview::{
    create_router, start_session, AppState, BackendClient, Config, InterviewError,
    InterviewServices, JsonTranscriptStore, NatsSpeechFactory, Phase, SessionConfig,
    SpeechDeviceFactory, TranscriptStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mock-interview", version, about = "Voice-driven mock interview service")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, global = true, default_value = "config/mock-interview")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve,
    /// Run one interview from the terminal
    Run {
        #[arg(long)]
        resume_id: String,
        #[arg(long)]
        user_id: String,
        #[arg(long, default_value_t = 10)]
        duration: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Mock Interview v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    let backend = Arc::new(BackendClient::new(
        cfg.backend.base_url.clone(),
        Duration::from_secs(cfg.backend.request_timeout_secs),
    )?);
    let store: Arc<dyn TranscriptStore> =
        Arc::new(JsonTranscriptStore::new(&cfg.storage.transcripts_path)?);
    let services = InterviewServices::from_backend(backend, Some(store));
    let devices = Arc::new(NatsSpeechFactory::new(cfg.nats.url.clone()));

    match cli.command {
        Commands::Serve => serve(cfg, services, devices).await,
        Commands::Run {
            resume_id,
            user_id,
            duration,
        } => run_interview(cfg, services, devices, resume_id, user_id, duration).await,
    }
}

async fn serve(
    cfg: Config,
    services: InterviewServices,
    devices: Arc<NatsSpeechFactory>,
) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let state = AppState::new(services, devices, cfg.interview);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("HTTP server failed")
}

async fn run_interview(
    cfg: Config,
    services: InterviewServices,
    devices: Arc<NatsSpeechFactory>,
    resume_id: String,
    user_id: String,
    duration: u32,
) -> Result<()> {
    let config =
        SessionConfig::new(resume_id, user_id, duration).with_interview_settings(&cfg.interview);
    let devices = devices.create(&config.session_id).await?;
    let handle = start_session(config, services, devices)?;

    // Ctrl+C ends the interview early; the transcript is still assessed
    let interrupt = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; ending interview");
            interrupt.end_session().await;
        }
    });

    let mut question = None;
    let snapshot = handle
        .wait_for(|s| {
            if s.phase == Phase::Narrating && question != Some(s.current_index) {
                question = Some(s.current_index);
                if let Some(q) = &s.current_question {
                    println!("\nQuestion {}/{}: {}", s.current_index + 1, s.question_count, q.text);
                }
            }
            s.is_finished()
        })
        .await;

    if let Some(reason) = snapshot.setup_failure() {
        return Err(InterviewError::CannotStart(reason.to_string()).into());
    }

    println!("\n{}", "=".repeat(60));
    for (index, qa) in snapshot.answers.iter().enumerate() {
        println!("Q{}: {}\nA{}: {}\n", index + 1, qa.question, index + 1, qa.answer);
    }
    if let Some(summary) = snapshot.summary {
        println!(
            "Answered {}/{} questions ({}%)",
            summary.questions_answered, summary.total_questions, summary.completion_rate
        );
    }
    match snapshot.scorecard() {
        Some(scorecard) => println!("{}", serde_json::to_string_pretty(scorecard)?),
        None => println!("Scorecard unavailable: {:?}", snapshot.assessment),
    }

    Ok(())
}
