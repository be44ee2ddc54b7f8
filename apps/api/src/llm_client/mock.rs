//! Scripted provider for feature tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Completion, CompletionProvider, CompletionRequest, LlmError};

/// Returns queued outcomes in order and records every request it receives.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<Completion, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(text: &str) -> Self {
        let provider = Self::new();
        provider.push_text(text);
        provider
    }

    pub fn push_text(&self, text: &str) {
        self.push(Ok(Completion::new(text)));
    }

    pub fn push(&self, outcome: Result<Completion, LlmError>) {
        self.replies.lock().unwrap().push_back(outcome);
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> CompletionRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Completion::fallback(None)))
    }
}
