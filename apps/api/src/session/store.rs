//! In-memory session registry.
//!
//! A session owns one résumé at most, the mentor transcript and the
//! application board. Nothing here is persisted.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::coaching::prompts::MENTOR_GREETING;
use crate::errors::AppError;
use crate::llm_client::ConversationTurn;
use crate::resume::pdf::ExtractedDocument;
use crate::session::tracker::ApplicationTracker;

/// The uploaded résumé and where it came from.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub extracted: ExtractedDocument,
}

impl ResumeDocument {
    pub fn new(file_name: impl Into<String>, extracted: ExtractedDocument) -> Self {
        Self {
            file_name: file_name.into(),
            uploaded_at: Utc::now(),
            extracted,
        }
    }

    pub fn text(&self) -> String {
        self.extracted.text()
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub document: Option<ResumeDocument>,
    pub transcript: Vec<ConversationTurn>,
    pub applications: ApplicationTracker,
}

impl Session {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            document: None,
            transcript: fresh_transcript(),
            applications: ApplicationTracker::default(),
        }
    }

    /// Replaces the résumé. The mentor transcript refers to the old one, so it
    /// restarts from the greeting.
    pub fn replace_document(&mut self, document: ResumeDocument) {
        self.document = Some(document);
        self.transcript = fresh_transcript();
    }

    pub fn resume_text(&self) -> Option<String> {
        self.document.as_ref().map(ResumeDocument::text)
    }

    /// Résumé text for features that cannot run without one.
    pub fn require_resume_text(&self) -> Result<String, AppError> {
        self.resume_text()
            .ok_or_else(|| AppError::Validation("Please upload your resume first.".to_string()))
    }
}

fn fresh_transcript() -> Vec<ConversationTurn> {
    vec![ConversationTurn::assistant(MENTOR_GREETING)]
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Session {
        let session = Session::new(Uuid::new_v4());
        self.inner.write().await.insert(session.id, session.clone());
        info!(session_id = %session.id, "Session created");
        session
    }

    /// A snapshot of the session.
    pub async fn get(&self, id: Uuid) -> Result<Session, AppError> {
        self.with_session(id, Session::clone).await
    }

    /// Reads the session under the shared lock.
    pub async fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&Session) -> R,
    ) -> Result<R, AppError> {
        let sessions = self.inner.read().await;
        sessions.get(&id).map(f).ok_or_else(|| not_found(id))
    }

    /// Mutates the session under the exclusive lock.
    pub async fn update<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, AppError> {
        let mut sessions = self.inner.write().await;
        sessions.get_mut(&id).map(f).ok_or_else(|| not_found(id))
    }

    /// Start over: same id, everything else dropped.
    pub async fn clear(&self, id: Uuid) -> Result<Session, AppError> {
        self.update(id, |session| {
            *session = Session::new(session.id);
            session.clone()
        })
        .await
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| info!(session_id = %id, "Session removed"))
            .ok_or_else(|| not_found(id))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
