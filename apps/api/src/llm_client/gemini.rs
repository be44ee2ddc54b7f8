//! Gemini `generateContent` provider.
//!
//! Wire contract: POST `{base}/v1beta/models/{model}:generateContent?key=...` with
//! `{contents, systemInstruction, generationConfig}`; reply text lives at
//! `candidates[0].content.parts[0].text`.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::retry::{retry, RetryPolicy};
use super::{
    Completion, CompletionProvider, CompletionRequest, LlmError, ModelTier, ResponseFormat,
};

const JSON_MIME_TYPE: &str = "application/json";

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<WireContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent<'a>>,
    generation_config: WireGenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct WireContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
struct WirePart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig<'a> {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

fn build_body(request: &CompletionRequest) -> GenerateContentRequest<'_> {
    let contents = request
        .contents
        .iter()
        .map(|turn| WireContent {
            role: Some(turn.role.wire_name()),
            parts: vec![WirePart {
                text: &turn.content,
            }],
        })
        .collect();

    let system_instruction = (!request.system.trim().is_empty()).then(|| WireContent {
        role: None,
        parts: vec![WirePart {
            text: &request.system,
        }],
    });

    let (response_mime_type, response_schema) = match &request.format {
        ResponseFormat::Text => (None, None),
        ResponseFormat::Json { schema } => (Some(JSON_MIME_TYPE), schema.as_ref()),
    };

    GenerateContentRequest {
        contents,
        system_instruction,
        generation_config: WireGenerationConfig {
            temperature: request.options.temperature,
            top_k: request.options.top_k,
            top_p: request.options.top_p,
            max_output_tokens: request.options.max_output_tokens,
            response_mime_type,
            response_schema,
        },
    }
}

/// Pulls the reply text out of a 2xx body.
///
/// No candidates, a blocked prompt, a candidate stopped for safety, or blank
/// text all count as an empty reply. A body that is not the expected envelope,
/// or a normally finished candidate without text, is a decode error.
fn parse_envelope(body: &str) -> Result<Completion, LlmError> {
    let envelope: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Decode {
            reason: format!("unexpected response envelope: {e}"),
            raw: body.to_string(),
        })?;

    if let Some(usage) = &envelope.usage_metadata {
        debug!(
            "Completion succeeded: prompt_tokens={}, candidate_tokens={}",
            usage.prompt_token_count, usage.candidates_token_count
        );
    }

    let Some(candidate) = envelope.candidates.into_iter().next() else {
        let reason = envelope.prompt_feedback.and_then(|f| f.block_reason);
        warn!("Completion returned no candidates (block reason: {reason:?})");
        return Ok(Completion::fallback(reason));
    };

    let text = candidate
        .content
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text);

    match text {
        Some(text) if !text.trim().is_empty() => Ok(Completion {
            text,
            empty: false,
            finish_reason: candidate.finish_reason,
        }),
        Some(_) => {
            warn!(
                "Completion returned blank text (finish reason: {:?})",
                candidate.finish_reason
            );
            Ok(Completion::fallback(candidate.finish_reason))
        }
        None => match candidate.finish_reason.as_deref() {
            Some(reason) if reason != "STOP" => {
                warn!("Completion stopped without text (finish reason: {reason})");
                Ok(Completion::fallback(candidate.finish_reason))
            }
            _ => Err(LlmError::Decode {
                reason: "missing candidates[0].content.parts[0].text".to_string(),
                raw: body.to_string(),
            }),
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Connection settings for [`GeminiClient`].
#[derive(Clone)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub analysis_model: String,
    pub chat_model: String,
    pub retry: RetryPolicy,
}

impl fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("analysis_model", &self.analysis_model)
            .field("chat_model", &self.chat_model)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Production completion provider. Retries transient failures per its `RetryPolicy`.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            settings,
        })
    }

    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Analysis => &self.settings.analysis_model,
            ModelTier::Conversational => &self.settings.chat_model,
        }
    }

    fn endpoint(&self, tier: ModelTier) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.model_for(tier)
        )
    }

    /// One POST, no retry. Returns the raw 2xx body.
    async fn send_once(
        &self,
        url: &str,
        api_key: &str,
        body: &GenerateContentRequest<'_>,
        request: &CompletionRequest,
    ) -> Result<String, LlmError> {
        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .timeout(request.timeout)
            .json(body)
            .send()
            .await
            .map_err(redact_url)?;

        let status = response.status();
        let text = response.text().await.map_err(redact_url)?;

        if !status.is_success() {
            warn!("Completion API returned {}: {}", status, text);
            return Err(LlmError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

/// reqwest errors print their URL, and ours carries the key.
fn redact_url(err: reqwest::Error) -> LlmError {
    LlmError::Network(err.without_url())
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey)?;
        let url = self.endpoint(request.tier);
        let body = build_body(request);

        debug!(
            "Sending completion request: model={}, turns={}, json={}",
            self.model_for(request.tier),
            request.contents.len(),
            matches!(request.format, ResponseFormat::Json { .. })
        );

        let raw = retry(&self.settings.retry, LlmError::is_transient, |_| {
            self.send_once(&url, api_key, &body, request)
        })
        .await?;

        parse_envelope(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{ConversationTurn, GenerationOptions, EMPTY_RESPONSE_FALLBACK};
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::json;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };
    use std::time::Duration;

    // ── Envelope parsing ────────────────────────────────────────────────────

    #[test]
    fn test_envelope_text_is_extracted() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"hello"}]},"finishReason":"STOP"}],
                       "usageMetadata":{"promptTokenCount":3,"candidatesTokenCount":1}}"#;
        let completion = parse_envelope(body).unwrap();
        assert_eq!(completion.text, "hello");
        assert!(!completion.empty);
    }

    #[test]
    fn test_empty_text_yields_fallback_not_error() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#;
        let completion = parse_envelope(body).unwrap();
        assert!(completion.empty);
        assert_eq!(completion.text, EMPTY_RESPONSE_FALLBACK);
    }

    #[test]
    fn test_blocked_prompt_yields_fallback() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let completion = parse_envelope(body).unwrap();
        assert!(completion.empty);
        assert_eq!(completion.finish_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_safety_stop_without_content_yields_fallback() {
        let body = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        assert!(parse_envelope(body).unwrap().empty);
    }

    #[test]
    fn test_missing_text_path_is_decode_error() {
        let body = r#"{"candidates":[{"content":{"parts":[]},"finishReason":"STOP"}]}"#;
        assert!(matches!(parse_envelope(body), Err(LlmError::Decode { .. })));
    }

    #[test]
    fn test_non_json_body_is_decode_error() {
        assert!(matches!(
            parse_envelope("<html>oops</html>"),
            Err(LlmError::Decode { .. })
        ));
    }

    // ── Request body ────────────────────────────────────────────────────────

    #[test]
    fn test_body_shape_for_schema_request() {
        let schema = json!({"type": "OBJECT"});
        let request = CompletionRequest::single("be precise", "resume text")
            .with_format(ResponseFormat::Json {
                schema: Some(schema.clone()),
            })
            .with_options(GenerationOptions::PRECISE);

        let body = serde_json::to_value(build_body(&request)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "resume text");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be precise");
        assert!(body["systemInstruction"].get("role").is_none());
        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"], schema);
        assert_eq!(config["topK"], 40);
        assert_eq!(config["maxOutputTokens"], 8192);
        assert!((config["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_body_shape_for_chat_request() {
        let history = vec![
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("hello"),
        ];
        let request = CompletionRequest::chat("mentor", &history, "next");
        let body = serde_json::to_value(build_body(&request)).unwrap();

        let roles: Vec<&str> = body["contents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_blank_system_is_omitted() {
        let request = CompletionRequest::single("  ", "prompt");
        let body = serde_json::to_value(build_body(&request)).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = test_settings("http://localhost".to_string(), Some("secret-key"));
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }

    // ── Against a local mock of the service ─────────────────────────────────

    #[derive(Clone)]
    struct MockService {
        /// Status codes to return, in order; success once exhausted.
        failures: Arc<Mutex<Vec<u16>>>,
        /// The first `stalls` hits sleep for `STALL` before answering.
        stalls: usize,
        hits: Arc<AtomicUsize>,
        last_query_key: Arc<Mutex<Option<String>>>,
        reply: Value,
    }

    async fn mock_generate(
        State(mock): State<MockService>,
        axum::extract::Query(query): axum::extract::Query<std::collections::HashMap<String, String>>,
        Json(_body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let hit = mock.hits.fetch_add(1, Ordering::SeqCst);
        if hit < mock.stalls {
            tokio::time::sleep(STALL).await;
        }
        *mock.last_query_key.lock().unwrap() = query.get("key").cloned();
        let next = {
            let mut failures = mock.failures.lock().unwrap();
            (!failures.is_empty()).then(|| failures.remove(0))
        };
        match next {
            Some(code) => (
                StatusCode::from_u16(code).unwrap(),
                Json(json!({"error": {"message": "mock failure"}})),
            ),
            None => (StatusCode::OK, Json(mock.reply.clone())),
        }
    }

    const STALL: Duration = Duration::from_millis(500);

    async fn spawn_mock(failures: Vec<u16>, reply: Value) -> (String, MockService) {
        spawn_stalling_mock(failures, 0, reply).await
    }

    async fn spawn_stalling_mock(
        failures: Vec<u16>,
        stalls: usize,
        reply: Value,
    ) -> (String, MockService) {
        let mock = MockService {
            failures: Arc::new(Mutex::new(failures)),
            stalls,
            hits: Arc::new(AtomicUsize::new(0)),
            last_query_key: Arc::new(Mutex::new(None)),
            reply,
        };
        let app = Router::new()
            .route(
                "/v1beta/models/:model_action",
                post(mock_generate),
            )
            .with_state(mock.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), mock)
    }

    fn test_settings(base_url: String, api_key: Option<&str>) -> GeminiSettings {
        GeminiSettings {
            api_key: api_key.map(str::to_string),
            base_url,
            analysis_model: "analysis-model".to_string(),
            chat_model: "chat-model".to_string(),
            retry: RetryPolicy {
                max_attempts: 5,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(8),
            },
        }
    }

    fn text_reply(text: &str) -> Value {
        json!({"candidates": [{"content": {"parts": [{"text": text}]}, "finishReason": "STOP"}]})
    }

    #[tokio::test]
    async fn test_client_retries_server_errors_then_succeeds() {
        let (base, mock) = spawn_mock(vec![503, 503, 500, 503], text_reply("roadmap")).await;
        let client = GeminiClient::new(test_settings(base, Some("k"))).unwrap();

        let completion = client
            .complete(&CompletionRequest::single("sys", "prompt"))
            .await
            .unwrap();

        assert_eq!(completion.text, "roadmap");
        assert_eq!(mock.hits.load(Ordering::SeqCst), 5);
        assert_eq!(mock.last_query_key.lock().unwrap().as_deref(), Some("k"));
    }

    #[tokio::test]
    async fn test_client_retries_timed_out_requests() {
        let (base, mock) = spawn_stalling_mock(vec![], 2, text_reply("ok")).await;
        let client = GeminiClient::new(test_settings(base, Some("k"))).unwrap();
        let request =
            CompletionRequest::single("sys", "prompt").with_timeout(Duration::from_millis(100));

        let completion = client.complete(&request).await.unwrap();

        assert_eq!(completion.text, "ok");
        assert_eq!(mock.hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_timeout_on_every_attempt_is_network_error() {
        let (base, mock) = spawn_stalling_mock(vec![], 10, text_reply("never")).await;
        let client = GeminiClient::new(test_settings(base, Some("k"))).unwrap();
        let request =
            CompletionRequest::single("sys", "prompt").with_timeout(Duration::from_millis(50));

        let result = client.complete(&request).await;

        assert!(matches!(result, Err(LlmError::Network(ref e)) if e.is_timeout()));
        assert_eq!(mock.hits.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_client_gives_up_after_five_server_errors() {
        let (base, mock) = spawn_mock(vec![500; 6], text_reply("never")).await;
        let client = GeminiClient::new(test_settings(base, Some("k"))).unwrap();

        let result = client
            .complete(&CompletionRequest::single("sys", "prompt"))
            .await;

        assert!(matches!(result, Err(LlmError::Http { status: 500, .. })));
        assert_eq!(mock.hits.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_client_does_not_retry_bad_credential() {
        let (base, mock) = spawn_mock(vec![401], text_reply("never")).await;
        let client = GeminiClient::new(test_settings(base, Some("bad"))).unwrap();

        let result = client
            .complete(&CompletionRequest::single("sys", "prompt"))
            .await;

        assert!(matches!(result, Err(LlmError::Http { status: 401, .. })));
        assert_eq!(mock.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_client_without_key_never_calls_out() {
        let (base, mock) = spawn_mock(vec![], text_reply("never")).await;
        let client = GeminiClient::new(test_settings(base, None)).unwrap();

        let result = client
            .complete(&CompletionRequest::single("sys", "prompt"))
            .await;

        assert!(matches!(result, Err(LlmError::MissingApiKey)));
        assert_eq!(mock.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_client_connection_refused_is_network_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GeminiClient::new(test_settings(
            format!("http://{addr}"),
            Some("secret-key-123"),
        ))
        .unwrap();
        let result = client
            .complete(&CompletionRequest::single("sys", "prompt"))
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, LlmError::Network(_)));
        assert!(!err.to_string().contains("secret-key-123"));
    }

    #[test]
    fn test_endpoint_uses_tier_model() {
        let client =
            GeminiClient::new(test_settings("http://host/".to_string(), Some("k"))).unwrap();
        assert_eq!(
            client.endpoint(ModelTier::Conversational),
            "http://host/v1beta/models/chat-model:generateContent"
        );
        assert_eq!(client.model_for(ModelTier::Analysis), "analysis-model");
    }
}
