//! AI mentor: résumé-aware career chat.
//!
//! The résumé rides in the system instruction; the transcript is replayed as
//! history with the new prompt last. The transcript itself is owned by the
//! session, not by this module.

use crate::coaching::prompts::{MENTOR_SYSTEM_TEMPLATE, NO_RESUME_CONTEXT};
use crate::errors::AppError;
use crate::llm_client::prompts::render;
use crate::llm_client::{Completion, CompletionProvider, CompletionRequest, ConversationTurn};

/// Builds the mentor system instruction around the résumé, if any.
fn mentor_system(resume_text: Option<&str>) -> String {
    let context = resume_text
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(NO_RESUME_CONTEXT);
    render(MENTOR_SYSTEM_TEMPLATE, &[("resume_text", context)])
}

/// Answers `prompt` given the prior `history`.
pub async fn ask_mentor(
    prompt: &str,
    history: &[ConversationTurn],
    resume_text: Option<&str>,
    llm: &dyn CompletionProvider,
) -> Result<Completion, AppError> {
    if prompt.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let request = CompletionRequest::chat(mentor_system(resume_text), history, prompt);
    llm.complete(&request).await.map_err(AppError::from)
}
