use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::tracker::{ApplicationStatus, JobApplicationRecord};
use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ResumeSummary {
    pub file_name: String,
    pub page_count: usize,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub resume: Option<ResumeSummary>,
    pub transcript_len: usize,
    pub applications: Vec<JobApplicationRecord>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at,
            resume: session.document.as_ref().map(|d| ResumeSummary {
                file_name: d.file_name.clone(),
                page_count: d.extracted.page_count(),
                uploaded_at: d.uploaded_at,
            }),
            transcript_len: session.transcript.len(),
            applications: session.applications.records().to_vec(),
        }
    }
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(SessionView::from(&session)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(SessionView::from(&session)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.clear(id).await?;
    Ok(Json(SessionView::from(&session)))
}

#[derive(Debug, Deserialize)]
pub struct NewApplication {
    pub company: String,
    pub title: String,
    #[serde(default)]
    pub status: ApplicationStatus,
}

#[derive(Debug, Deserialize)]
pub struct MoveApplication {
    pub status: ApplicationStatus,
}

/// GET /api/v1/sessions/:id/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<JobApplicationRecord>>, AppError> {
    let records = state
        .sessions
        .with_session(id, |s| s.applications.records().to_vec())
        .await?;
    Ok(Json(records))
}

/// POST /api/v1/sessions/:id/applications
pub async fn handle_add_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<NewApplication>,
) -> Result<(StatusCode, Json<JobApplicationRecord>), AppError> {
    let record = state
        .sessions
        .update(id, |s| s.applications.add(&req.company, &req.title, req.status))
        .await??;
    tracing::info!(session_id = %id, application_id = record.id, "Application added");
    Ok((StatusCode::CREATED, Json(record)))
}

/// PATCH /api/v1/sessions/:id/applications/:app_id
pub async fn handle_move_application(
    State(state): State<AppState>,
    Path((id, app_id)): Path<(Uuid, u64)>,
    Json(req): Json<MoveApplication>,
) -> Result<Json<JobApplicationRecord>, AppError> {
    let record = state
        .sessions
        .update(id, |s| s.applications.move_to(app_id, req.status))
        .await??;
    Ok(Json(record))
}

/// DELETE /api/v1/sessions/:id/applications/:app_id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    Path((id, app_id)): Path<(Uuid, u64)>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .update(id, |s| s.applications.delete(app_id))
        .await??;
    Ok(StatusCode::NO_CONTENT)
}
