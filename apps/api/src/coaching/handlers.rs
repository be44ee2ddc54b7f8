use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::coaching::mentor::ask_mentor;
use crate::coaching::roadmap::{generate_roadmap, RoadmapTarget};
use crate::errors::AppError;
use crate::llm_client::{Completion, ConversationTurn};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MentorMessage {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MentorResponse {
    pub reply: Completion,
    pub transcript: Vec<ConversationTurn>,
}

/// POST /api/v1/sessions/:id/roadmap
pub async fn handle_roadmap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(target): Json<RoadmapTarget>,
) -> Result<Json<Completion>, AppError> {
    let resume = state
        .sessions
        .with_session(id, |s| s.require_resume_text())
        .await??;
    let roadmap = generate_roadmap(&resume, &target, state.llm.as_ref()).await?;
    Ok(Json(roadmap))
}

/// GET /api/v1/sessions/:id/mentor
pub async fn handle_get_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ConversationTurn>>, AppError> {
    let transcript = state
        .sessions
        .with_session(id, |s| s.transcript.clone())
        .await?;
    Ok(Json(transcript))
}

/// POST /api/v1/sessions/:id/mentor
///
/// The lock is not held across the model call; the turn pair is appended
/// only after a usable reply.
pub async fn handle_mentor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MentorMessage>,
) -> Result<Json<MentorResponse>, AppError> {
    let (history, resume) = state
        .sessions
        .with_session(id, |s| (s.transcript.clone(), s.resume_text()))
        .await?;

    let reply = ask_mentor(&req.message, &history, resume.as_deref(), state.llm.as_ref()).await?;

    let transcript = state
        .sessions
        .update(id, |s| {
            if reply.empty {
                warn!(session_id = %id, "Mentor reply was empty; transcript unchanged");
            } else {
                s.transcript.push(ConversationTurn::user(req.message.trim()));
                s.transcript.push(ConversationTurn::assistant(reply.text.clone()));
            }
            s.transcript.clone()
        })
        .await?;

    Ok(Json(MentorResponse { reply, transcript }))
}
