//! Career roadmap: a free-text 30-day plan toward a role or a specific JD.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coaching::prompts::{ROADMAP_BY_JD_PROMPT, ROADMAP_BY_ROLE_PROMPT, ROADMAP_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::prompts::render;
use crate::llm_client::{
    Completion, CompletionProvider, CompletionRequest, GenerationOptions, ModelTier,
};

const ROADMAP_TIMEOUT: Duration = Duration::from_secs(90);

/// What the roadmap should prepare the user for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum RoadmapTarget {
    /// A general job title, e.g. "Data Scientist".
    Role(String),
    /// The full text of a job posting.
    JobDescription(String),
}

impl RoadmapTarget {
    pub fn text(&self) -> &str {
        match self {
            RoadmapTarget::Role(s) | RoadmapTarget::JobDescription(s) => s,
        }
    }

    fn prompt(&self, resume_text: &str) -> String {
        match self {
            RoadmapTarget::Role(role) => render(
                ROADMAP_BY_ROLE_PROMPT,
                &[("target_role", role.trim()), ("resume_text", resume_text)],
            ),
            RoadmapTarget::JobDescription(jd) => render(
                ROADMAP_BY_JD_PROMPT,
                &[("jd_text", jd), ("resume_text", resume_text)],
            ),
        }
    }
}

/// Generates a Markdown roadmap for `target` based on `resume_text`.
pub async fn generate_roadmap(
    resume_text: &str,
    target: &RoadmapTarget,
    llm: &dyn CompletionProvider,
) -> Result<Completion, AppError> {
    if target.text().trim().is_empty() {
        return Err(AppError::Validation(match target {
            RoadmapTarget::Role(_) => "Please enter a job role.".to_string(),
            RoadmapTarget::JobDescription(_) => "Please paste a job description.".to_string(),
        }));
    }

    let request = CompletionRequest::single(ROADMAP_SYSTEM, target.prompt(resume_text))
        .with_options(GenerationOptions::PLANNING)
        .with_tier(ModelTier::Conversational)
        .with_timeout(ROADMAP_TIMEOUT);

    llm.complete(&request).await.map_err(AppError::from)
}
