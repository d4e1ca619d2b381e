//! Axum route handlers for the Interview API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::profile::{CandidateProfile, ProfileForm};
use crate::interview::session::{
    Cursor, Phase, SessionState, SessionSummary, TranscriptEntry, Turn,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

/// Snapshot of a session as the UI sees it.
#[derive(Debug, Serialize)]
pub struct InterviewView {
    pub session_id: Uuid,
    pub phase: Phase,
    pub current_prompt: String,
    pub cursor: Cursor,
    pub started_at: DateTime<Utc>,
    pub candidate: Option<CandidateProfile>,
    pub transcript: Vec<TranscriptEntry>,
}

impl InterviewView {
    fn of(session: &SessionState) -> Self {
        Self {
            session_id: session.id(),
            phase: session.phase(),
            current_prompt: session.current_prompt(),
            cursor: session.cursor(),
            started_at: session.created_at(),
            candidate: session.profile().cloned(),
            transcript: session.transcript().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub turn: Turn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    /// Present only once the interview has ended; the session is gone from memory by then.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SessionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<Vec<TranscriptEntry>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Opens a new session in CollectingProfile.
pub async fn handle_start_interview(
    State(state): State<AppState>,
) -> (StatusCode, Json<InterviewView>) {
    let session = SessionState::new(state.config.answer_feedback);
    let view = InterviewView::of(&session);
    info!("Session {} started", session.id());
    state.store.put(session).await;
    (StatusCode::CREATED, Json(view))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    let session = load(&state, session_id).await?;
    Ok(Json(InterviewView::of(&session)))
}

/// POST /api/v1/interviews/:id/profile
///
/// Merges the submitted fields. Once all validate, the first question is asked.
/// An invalid field returns 400 naming the field; the fields already given are kept.
/// A session discarded while the first question was being generated stays gone (404).
pub async fn handle_submit_profile(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<TurnResponse>, AppError> {
    let mut session = load(&state, session_id).await?;

    let result = session
        .submit_profile(form, state.completions.as_ref())
        .await;
    // keep accumulated fields even when validation fails
    if !state.store.replace(session.clone()).await {
        return Err(discarded_mid_turn(session_id));
    }
    let turn = result?;

    Ok(Json(TurnResponse {
        session_id,
        turn,
        greeting: session.greeting(),
        summary: None,
        transcript: None,
    }))
}

/// POST /api/v1/interviews/:id/answers
///
/// Records one answer (or handles an exit phrase) and returns the next prompt.
/// A terminal turn carries the summary and transcript and clears the session.
/// A session discarded while the turn was in flight stays gone (404).
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let mut session = load(&state, session_id).await?;

    let turn = session
        .submit_answer(&request.answer, state.completions.as_ref())
        .await?;

    let (summary, transcript) = if session.phase().is_terminal() {
        let summary = session.summary();
        let transcript = session.transcript().to_vec();
        if !state.store.clear(session_id).await {
            return Err(discarded_mid_turn(session_id));
        }
        debug!("Session {} phase trail: {:?}", session_id, session.trail());
        info!(
            "Session {} ended ({:?}): {} questions, {} answers",
            session_id, summary.outcome, summary.questions_asked, summary.answers_recorded
        );
        (Some(summary), Some(transcript))
    } else {
        if !state.store.replace(session).await {
            return Err(discarded_mid_turn(session_id));
        }
        (None, None)
    };

    Ok(Json(TurnResponse {
        session_id,
        turn,
        greeting: None,
        summary,
        transcript,
    }))
}

/// DELETE /api/v1/interviews/:id
///
/// Discards the session ("Start New Interview").
pub async fn handle_discard_interview(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.store.clear(session_id).await {
        info!("Session {} discarded", session_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(session_id))
    }
}

async fn load(state: &AppState, session_id: Uuid) -> Result<SessionState, AppError> {
    state
        .store
        .get(session_id)
        .await
        .ok_or_else(|| not_found(session_id))
}

fn discarded_mid_turn(session_id: Uuid) -> AppError {
    warn!("Session {} was discarded mid-turn; dropping its update", session_id);
    not_found(session_id)
}

fn not_found(session_id: Uuid) -> AppError {
    AppError::NotFound(format!("Interview {session_id} not found"))
}
