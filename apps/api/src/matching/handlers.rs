use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::Structured;
use crate::matching::analyzer::{analyze_resume, ResumeAnalysis};
use crate::matching::gap::{analyze_gaps, GapAnalysis};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobDescriptionRequest {
    pub job_description: String,
}

impl JobDescriptionRequest {
    fn validated(&self) -> Result<&str, AppError> {
        let jd = self.job_description.trim();
        if jd.is_empty() {
            return Err(AppError::Validation(
                "Please paste a job description.".to_string(),
            ));
        }
        Ok(jd)
    }
}

async fn resume_text(state: &AppState, id: Uuid) -> Result<String, AppError> {
    state
        .sessions
        .with_session(id, |s| s.require_resume_text())
        .await?
}

/// POST /api/v1/sessions/:id/analysis
pub async fn handle_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<JobDescriptionRequest>,
) -> Result<Json<Structured<ResumeAnalysis>>, AppError> {
    let jd = req.validated()?;
    let resume = resume_text(&state, id).await?;
    let analysis = analyze_resume(&resume, jd, state.llm.as_ref()).await?;
    if analysis.value.needs_tailoring() {
        tracing::info!(
            session_id = %id,
            relevance = analysis.value.experience_relevance_score,
            "Low experience relevance; tailoring recommended"
        );
    }
    Ok(Json(analysis))
}

/// POST /api/v1/sessions/:id/compare
pub async fn handle_compare(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<JobDescriptionRequest>,
) -> Result<Json<Structured<GapAnalysis>>, AppError> {
    let jd = req.validated()?;
    let resume = resume_text(&state, id).await?;
    let gap = analyze_gaps(&resume, jd, state.llm.as_ref()).await?;
    tracing::info!(session_id = %id, fit_score = gap.value.fit_score(), "Gap analysis complete");
    Ok(Json(gap))
}
