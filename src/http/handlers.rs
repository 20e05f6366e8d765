use super::state::{AppState, SessionEntry};
use crate::error::InterviewError;
use crate::services::Scorecard;
use crate::session::{
    start_session, AssessmentStatus, CompletionSummary, EndReason, InterviewHandle, Phase,
    QaEntry, SessionConfig, SessionSnapshot,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    /// Optional session ID (if not provided, generate UUID)
    pub session_id: Option<String>,

    pub resume_id: String,
    pub user_id: String,
    pub duration_minutes: u32,
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub session_id: String,
    pub status: Phase,
    pub question_count: usize,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct MicrophoneRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub session_id: String,
    pub phase: Phase,
    pub qa: Vec<QaEntry>,
    pub summary: Option<CompletionSummary>,
    pub end_reason: Option<EndReason>,
    pub assessment: AssessmentStatus,
    pub scorecard: Option<Scorecard>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for InterviewError {
    fn into_response(self) -> Response {
        let status = match &self {
            InterviewError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            InterviewError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            InterviewError::SessionExists(_) => StatusCode::CONFLICT,
            InterviewError::CannotStart(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

async fn find_session(state: &AppState, session_id: &str) -> Result<InterviewHandle, InterviewError> {
    match state.sessions.read().await.get(session_id) {
        Some(SessionEntry::Active(handle)) => Ok(handle.clone()),
        _ => Err(InterviewError::SessionNotFound(session_id.to_string())),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Create devices, start the session and wait for its first question
async fn launch_session(
    state: &AppState,
    config: SessionConfig,
) -> Result<(InterviewHandle, SessionSnapshot), Response> {
    let session_id = config.session_id.clone();

    let devices = state.devices.create(&session_id).await.map_err(|e| {
        error!("Failed to create speech devices: {:#}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to create speech devices: {:#}", e),
            }),
        )
            .into_response()
    })?;

    let handle = start_session(config, state.services.clone(), devices)
        .map_err(IntoResponse::into_response)?;

    let snapshot = handle.wait_for(|s| s.phase != Phase::Loading).await;
    if let Some(reason) = snapshot.setup_failure() {
        warn!("Interview {} could not start: {}", session_id, reason);
        return Err(InterviewError::CannotStart(reason.to_string()).into_response());
    }

    Ok((handle, snapshot))
}

/// POST /interviews/start
/// Fetch questions and start narrating the first one
pub async fn start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> Response {
    if req.duration_minutes > state.interview.max_duration_minutes {
        return InterviewError::InvalidRequest(format!(
            "duration_minutes may not exceed {}",
            state.interview.max_duration_minutes
        ))
        .into_response();
    }

    // Generate or use provided session ID
    let session_id = req
        .session_id
        .unwrap_or_else(|| format!("interview-{}", uuid::Uuid::new_v4()));

    info!("Starting interview: {}", session_id);

    let config = SessionConfig {
        session_id: session_id.clone(),
        ..SessionConfig::new(req.resume_id, req.user_id, req.duration_minutes)
    }
    .with_interview_settings(&state.interview);

    if let Err(e) = config.validate() {
        return e.into_response();
    }

    if !state.reserve(&session_id).await {
        return InterviewError::SessionExists(session_id).into_response();
    }

    let (handle, snapshot) = match launch_session(&state, config).await {
        Ok(started) => started,
        Err(response) => {
            state.unreserve(&session_id).await;
            return response;
        }
    };

    state.activate(handle, state.interview.retention()).await;

    info!("Interview started successfully: {}", session_id);

    (
        StatusCode::OK,
        Json(StartInterviewResponse {
            session_id: session_id.clone(),
            status: snapshot.phase,
            question_count: snapshot.question_count,
            message: format!("Interview {} started", session_id),
        }),
    )
        .into_response()
}

/// POST /interviews/:session_id/next
/// Close the current question and move on
pub async fn next_question(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match find_session(&state, &session_id).await {
        Ok(handle) => {
            handle.advance_to_next_question().await;
            (StatusCode::ACCEPTED, Json(handle.snapshot())).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /interviews/:session_id/end
/// End the interview; the transcript stays available until released or expired
pub async fn end_interview(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    info!("Ending interview: {}", session_id);

    match find_session(&state, &session_id).await {
        Ok(handle) => {
            handle.end_session().await;
            let snapshot = handle.wait_for(|s| s.phase == Phase::Ended).await;
            (StatusCode::OK, Json(snapshot)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /interviews/:session_id/microphone
pub async fn set_microphone(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<MicrophoneRequest>,
) -> Response {
    match find_session(&state, &session_id).await {
        Ok(handle) => {
            handle.set_microphone(req.enabled).await;
            (StatusCode::ACCEPTED, Json(handle.snapshot())).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// DELETE /interviews/:session_id
/// End the interview if needed and forget it
pub async fn release_interview(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let entry = {
        let mut sessions = state.sessions.write().await;
        match sessions.get(&session_id) {
            Some(SessionEntry::Active(_)) => sessions.remove(&session_id),
            _ => None,
        }
    };

    match entry {
        Some(SessionEntry::Active(handle)) => {
            handle.end_session().await;
            info!("Interview released: {}", session_id);
            StatusCode::NO_CONTENT.into_response()
        }
        _ => InterviewError::SessionNotFound(session_id).into_response(),
    }
}

/// GET /interviews/:session_id/status
pub async fn get_interview_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match find_session(&state, &session_id).await {
        Ok(handle) => (StatusCode::OK, Json(handle.snapshot())).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /interviews/:session_id/transcript
/// Answers recorded so far, plus the scorecard once available
pub async fn get_interview_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match find_session(&state, &session_id).await {
        Ok(handle) => {
            let snapshot = handle.snapshot();
            let scorecard = snapshot.scorecard().cloned();
            (
                StatusCode::OK,
                Json(TranscriptResponse {
                    session_id: snapshot.session_id,
                    phase: snapshot.phase,
                    qa: snapshot.answers,
                    summary: snapshot.summary,
                    end_reason: snapshot.end_reason,
                    assessment: snapshot.assessment,
                    scorecard,
                }),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
