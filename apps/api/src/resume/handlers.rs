use anyhow::anyhow;
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::Structured;
use crate::resume::highlight::{highlight, Highlight};
use crate::resume::parser::{parse_resume, ResumeProfile};
use crate::resume::pdf::{extract_document, ExtractedDocument};
use crate::session::ResumeDocument;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";
const BLANK_TEXT_WARNING: &str = "No text could be extracted from this PDF. \
    If it is a scanned image, upload a text-based PDF instead.";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_name: String,
    pub page_count: usize,
    pub characters: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ResumeTextResponse {
    pub file_name: String,
    pub text: String,
    pub pages: Vec<String>,
    pub highlights: Vec<Highlight>,
}

/// POST /api/v1/sessions/:id/resume
///
/// Multipart upload; the PDF goes in the `file` field.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    // Fail fast on an unknown session before reading the body.
    state.sessions.with_session(id, |_| ()).await?;

    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
            upload = Some((file_name, field.bytes().await?));
            break;
        }
    }
    let (file_name, bytes) = upload.ok_or_else(|| {
        AppError::Validation(format!("multipart field '{UPLOAD_FIELD}' is required"))
    })?;

    let extracted = extract_blocking(bytes).await?;
    let response = UploadResponse {
        file_name: file_name.clone(),
        page_count: extracted.page_count(),
        characters: extracted.text().chars().count(),
        warning: extracted.is_blank().then_some(BLANK_TEXT_WARNING),
    };
    if extracted.is_blank() {
        warn!(session_id = %id, "Uploaded PDF has no extractable text");
    }

    state
        .sessions
        .update(id, |s| s.replace_document(ResumeDocument::new(file_name, extracted)))
        .await?;
    info!(session_id = %id, pages = response.page_count, "Resume uploaded");

    Ok(Json(response))
}

async fn extract_blocking(bytes: Bytes) -> Result<ExtractedDocument, AppError> {
    let extracted = tokio::task::spawn_blocking(move || extract_document(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow!("extraction task failed: {e}")))??;
    Ok(extracted)
}

/// GET /api/v1/sessions/:id/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeTextResponse>, AppError> {
    let document = state
        .sessions
        .with_session(id, |s| s.document.clone())
        .await?
        .ok_or_else(|| AppError::NotFound("No resume uploaded for this session".to_string()))?;

    let text = document.text();
    Ok(Json(ResumeTextResponse {
        highlights: highlight(&text),
        file_name: document.file_name,
        pages: document.extracted.pages().to_vec(),
        text,
    }))
}

/// POST /api/v1/sessions/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Structured<ResumeProfile>>, AppError> {
    let resume_text = state
        .sessions
        .with_session(id, |s| s.require_resume_text())
        .await??;
    let profile = parse_resume(&resume_text, state.llm.as_ref()).await?;
    if profile.value.skills.is_empty() {
        warn!(session_id = %id, "Structured resume has no skills");
    }
    Ok(Json(profile))
}
