/// LLM Client — the single point of entry for every generative-language call in Prospello.
///
/// ARCHITECTURAL RULE: feature modules build a `CompletionRequest` and hand it to a
/// `CompletionProvider`. Nothing else talks to the remote service, and nothing else retries.
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod decode;
pub mod gemini;
#[cfg(test)]
pub mod mock;
pub mod prompts;
pub mod retry;

pub use decode::{complete_json, lenient, lenient_score, lenient_vec, ResponseShape, Structured};
pub use gemini::GeminiClient;

/// Shown to the user when the model returns a well-formed but empty reply
/// (usually a safety filter).
pub const EMPTY_RESPONSE_FALLBACK: &str = "I'm sorry, I couldn't generate a response for that. \
    Could you please try rephrasing your request?";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("could not decode model reply: {reason}")]
    Decode { reason: String, raw: String },

    #[error("no API key configured for the completion service")]
    MissingApiKey,
}

impl LlmError {
    /// Connection failures, timeouts and 5xx responses are worth another attempt.
    /// Bad requests, bad credentials and undecodable replies are not.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Network(_) => true,
            LlmError::Http { status, .. } => (500..600).contains(status),
            LlmError::Decode { .. } | LlmError::MissingApiKey => false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Role name on the wire. The remote service calls the assistant "model".
    pub fn wire_name(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "model",
        }
    }
}

/// One message of a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl GenerationOptions {
    /// Low temperature for extraction and scoring, where fidelity matters more than prose.
    pub const PRECISE: Self = Self {
        temperature: 0.2,
        top_k: 40,
        top_p: 0.95,
        max_output_tokens: 8192,
    };

    /// Roadmaps: structured but allowed some variety.
    pub const PLANNING: Self = Self {
        temperature: 0.6,
        top_k: 1,
        top_p: 1.0,
        max_output_tokens: 8192,
    };

    /// Mentor chat.
    pub const CONVERSATIONAL: Self = Self {
        temperature: 0.7,
        top_k: 1,
        top_p: 1.0,
        max_output_tokens: 8192,
    };
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::PRECISE
    }
}

/// Shape of the reply the caller wants back.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// JSON output, optionally constrained server-side by a schema.
    Json { schema: Option<Value> },
}

/// Which configured model serves the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Analysis,
    Conversational,
}

/// A self-contained request. Built fresh per call and never mutated after sending.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub contents: Vec<ConversationTurn>,
    pub format: ResponseFormat,
    pub options: GenerationOptions,
    pub tier: ModelTier,
    pub timeout: Duration,
}

impl CompletionRequest {
    /// One-shot request: a system directive plus a single user turn.
    pub fn single(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            contents: vec![ConversationTurn::user(prompt)],
            format: ResponseFormat::Text,
            options: GenerationOptions::default(),
            tier: ModelTier::Analysis,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Chat request: the transcript so far, followed by the new user prompt.
    pub fn chat(
        system: impl Into<String>,
        history: &[ConversationTurn],
        prompt: impl Into<String>,
    ) -> Self {
        let mut contents = history.to_vec();
        contents.push(ConversationTurn::user(prompt));
        Self {
            system: system.into(),
            contents,
            format: ResponseFormat::Text,
            options: GenerationOptions::CONVERSATIONAL,
            tier: ModelTier::Conversational,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_tier(mut self, tier: ModelTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Provider seam
// ────────────────────────────────────────────────────────────────────────────

/// Text returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub text: String,
    /// True when the service answered but produced nothing usable; `text` then
    /// holds [`EMPTY_RESPONSE_FALLBACK`].
    pub empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            empty: false,
            finish_reason: None,
        }
    }

    pub fn fallback(finish_reason: Option<String>) -> Self {
        Self {
            text: EMPTY_RESPONSE_FALLBACK.to_string(),
            empty: true,
            finish_reason,
        }
    }
}

/// A completion backend. `GeminiClient` in production; canned providers in tests.
///
/// Carried in `AppState` as `Arc<dyn CompletionProvider>`. Implementations own
/// their retry behaviour so callers never loop themselves.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub(crate) fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_assistant_maps_to_model_role() {
        assert_eq!(Role::Assistant.wire_name(), "model");
        assert_eq!(Role::User.wire_name(), "user");
    }

    #[test]
    fn test_transient_classification() {
        let server = LlmError::Http {
            status: 503,
            body: String::new(),
        };
        let client = LlmError::Http {
            status: 429,
            body: String::new(),
        };
        assert!(server.is_transient());
        assert!(!client.is_transient());
        assert!(!LlmError::MissingApiKey.is_transient());
    }

    #[test]
    fn test_chat_request_appends_prompt_after_history() {
        let history = vec![
            ConversationTurn::user("How do I prepare?"),
            ConversationTurn::assistant("Start with the job description."),
        ];
        let request = CompletionRequest::chat("persona", &history, "And then?");

        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[2], ConversationTurn::user("And then?"));
        assert_eq!(request.tier, ModelTier::Conversational);
        assert_eq!(request.options, GenerationOptions::CONVERSATIONAL);
    }

    #[test]
    fn test_role_serde_lowercase() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
        assert_eq!(turn.role, Role::Assistant);
    }
}
