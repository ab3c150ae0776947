//! Generic HTTP provider for OpenAI-compatible APIs.
//!
//! Talks to `/chat/completions` (plain and `stream: true` SSE) and
//! `/embeddings`. One instance per catalog entry; the [`ProviderSpec`]
//! supplies name, capability flags and endpoint defaults, the provider's
//! configuration slice supplies credentials and overrides.
//!
//! Recognised configuration keys (after prefix stripping):
//! `api_key`, `api_base`, `chat_url`, `embedding_url`, `default_lm_model`,
//! `default_embedding_model`, `timeout_secs`.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use omnigate_core::types::{ChatRequest, LmParameters, Message, ModelParameters};
use omnigate_core::{Pluggable, Properties, ProviderError, ServiceLevel};

use crate::registry::ProviderSpec;
use crate::sink::TokenSink;
use crate::traits::{ChatProvider, EmbeddingProvider, GenerativeProvider};

pub const KEY_API_KEY: &str = "api_key";
pub const KEY_API_BASE: &str = "api_base";
pub const KEY_CHAT_URL: &str = "chat_url";
pub const KEY_EMBEDDING_URL: &str = "embedding_url";
pub const KEY_DEFAULT_LM_MODEL: &str = "default_lm_model";
pub const KEY_DEFAULT_EMBEDDING_MODEL: &str = "default_embedding_model";
pub const KEY_TIMEOUT_SECS: &str = "timeout_secs";

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A generative provider that talks to an OpenAI-compatible HTTP API.
pub struct HttpProvider {
    spec: &'static ProviderSpec,
    /// HTTP client (shared, connection-pooled). Rebuilt by `initialize`.
    client: reqwest::Client,
    api_key: String,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// Full chat endpoint, overriding `api_base`.
    chat_url: Option<String>,
    /// Full embeddings endpoint, overriding `api_base`.
    embedding_url: Option<String>,
    default_lm_model: String,
    default_embedding_model: String,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("provider", &self.spec.display_name)
            .field("api_base", &self.api_base)
            .field("default_lm_model", &self.default_lm_model)
            .finish()
    }
}

impl HttpProvider {
    /// An uninitialized provider carrying the spec's defaults.
    pub fn from_spec(spec: &'static ProviderSpec) -> Self {
        HttpProvider {
            spec,
            client: reqwest::Client::new(),
            api_key: String::new(),
            api_base: spec.default_api_base.to_string(),
            chat_url: None,
            embedding_url: None,
            default_lm_model: spec.default_lm_model.to_string(),
            default_embedding_model: spec.default_embedding_model.to_string(),
        }
    }

    /// Display name for logging.
    pub fn display_name(&self) -> &str {
        self.spec.display_name
    }

    /// Full chat completions URL.
    fn completions_url(&self) -> String {
        match &self.chat_url {
            Some(url) => url.clone(),
            None => format!("{}/chat/completions", self.api_base.trim_end_matches('/')),
        }
    }

    /// Full embeddings URL.
    fn embeddings_url(&self) -> String {
        match &self.embedding_url {
            Some(url) => url.clone(),
            None => format!("{}/embeddings", self.api_base.trim_end_matches('/')),
        }
    }

    fn lm_model<'a>(&'a self, requested: &'a str) -> &'a str {
        if requested.trim().is_empty() {
            &self.default_lm_model
        } else {
            requested
        }
    }

    fn completion_body<'a>(&'a self, request: &'a ChatRequest, stream: bool) -> CompletionBody<'a> {
        let params: &LmParameters = &request.parameters;
        CompletionBody {
            model: self.lm_model(&request.model_name),
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(&request.prompt)],
            max_tokens: nonzero_u32(params.max_tokens),
            temperature: nonzero_f32(params.temperature),
            top_p: nonzero_f32(params.top_p),
            frequency_penalty: nonzero_f32(params.frequency_penalty),
            presence_penalty: nonzero_f32(params.presence_penalty),
            stream,
        }
    }

    /// POST a JSON body, mapping transport failures and non-2xx statuses.
    async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, ProviderError> {
        let mut builder = self.client.post(url).json(body);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await.map_err(|e| {
            error!(provider = self.spec.name, error = %e, "HTTP request failed");
            ProviderError::Http(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(provider = self.spec.name, status = %status, body = %body, "API error");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn nonzero_u32(v: u32) -> Option<u32> {
    (v != 0).then_some(v)
}

fn nonzero_f32(v: f32) -> Option<f32> {
    (v != 0.0).then_some(v)
}

// ─────────────────────────────────────────────
// Wire types (OpenAI-compatible)
// ─────────────────────────────────────────────

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingBody<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<u32>,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// What one SSE line means for the stream.
enum SseLine {
    Token(String),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> Result<SseLine, ProviderError> {
    let Some(data) = line.trim_end_matches('\r').strip_prefix("data:") else {
        return Ok(SseLine::Skip);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(SseLine::Done);
    }
    if data.is_empty() {
        return Ok(SseLine::Skip);
    }
    let chunk: StreamChunk =
        serde_json::from_str(data).map_err(|e| ProviderError::Parse(e.to_string()))?;
    match chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
        Some(token) if !token.is_empty() => Ok(SseLine::Token(token)),
        _ => Ok(SseLine::Skip),
    }
}

// ─────────────────────────────────────────────
// Trait impls
// ─────────────────────────────────────────────

impl Pluggable for HttpProvider {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn initialize(&mut self, config: &Properties) -> Result<(), ProviderError> {
        let name = self.spec.name;

        match config.get_non_empty(KEY_API_KEY) {
            Some(key) => self.api_key = key.to_string(),
            None if self.spec.is_local => self.api_key.clear(),
            None => {
                return Err(ProviderError::config(
                    name,
                    format!("missing required key '{name}.{KEY_API_KEY}'"),
                ))
            }
        }

        if let Some(base) = config.get_non_empty(KEY_API_BASE) {
            self.api_base = base.to_string();
        }
        self.chat_url = config.get_non_empty(KEY_CHAT_URL).map(String::from);
        self.embedding_url = config.get_non_empty(KEY_EMBEDDING_URL).map(String::from);
        if let Some(model) = config.get_non_empty(KEY_DEFAULT_LM_MODEL) {
            self.default_lm_model = model.to_string();
        }
        if let Some(model) = config.get_non_empty(KEY_DEFAULT_EMBEDDING_MODEL) {
            self.default_embedding_model = model.to_string();
        }

        let timeout_secs = config
            .get_parsed::<u64>(KEY_TIMEOUT_SECS)
            .map_err(|e| ProviderError::config(name, e))?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        self.client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::config(name, format!("failed to build HTTP client: {e}")))?;

        info!(
            provider = name,
            api_base = %self.api_base,
            model = %self.default_lm_model,
            "HTTP provider configured"
        );
        Ok(())
    }
}

impl GenerativeProvider for HttpProvider {
    fn service_level(&self) -> ServiceLevel {
        self.spec.service_level
    }

    fn supports_chat(&self) -> bool {
        self.spec.supports_chat
    }

    fn supports_embeddings(&self) -> bool {
        self.spec.supports_embeddings
    }

    fn as_chat(&self) -> Option<&dyn ChatProvider> {
        self.spec.supports_chat.then_some(self as &dyn ChatProvider)
    }

    fn as_embedding(&self) -> Option<&dyn EmbeddingProvider> {
        self.spec
            .supports_embeddings
            .then_some(self as &dyn EmbeddingProvider)
    }
}

#[async_trait]
impl ChatProvider for HttpProvider {
    async fn generate_chat_response(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let body = self.completion_body(request, false);
        debug!(provider = self.spec.name, model = body.model, "Calling chat completion");

        let response = self.post(&self.completions_url(), &body).await?;
        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Parse("response has no choices".to_string()))?;
        Ok(content.trim().to_string())
    }

    async fn stream_chat_response(
        &self,
        request: &ChatRequest,
        sink: &TokenSink,
    ) -> Result<(), ProviderError> {
        let body = self.completion_body(request, true);
        debug!(provider = self.spec.name, model = body.model, "Streaming chat completion");

        let response = self.post(&self.completions_url(), &body).await?;
        let mut bytes = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut tokens = 0usize;
        let mut done = false;

        'read: while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(|e| ProviderError::Http(e.to_string()))?;
            buffer.extend_from_slice(&chunk);

            while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line[..line.len() - 1]);
                match parse_sse_line(&line)? {
                    SseLine::Token(token) => {
                        // Err here means the caller hung up; dropping `bytes`
                        // closes the upstream connection.
                        sink.send_token(token).await?;
                        tokens += 1;
                    }
                    SseLine::Done => {
                        done = true;
                        break 'read;
                    }
                    SseLine::Skip => {}
                }
            }
        }

        // Last line may arrive without a trailing newline.
        if !done && !buffer.is_empty() {
            let line = String::from_utf8_lossy(&buffer).into_owned();
            if let SseLine::Token(token) = parse_sse_line(&line)? {
                sink.send_token(token).await?;
                tokens += 1;
            }
        }

        debug!(provider = self.spec.name, tokens, "Stream finished");
        sink.complete().await;
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for HttpProvider {
    async fn generate_embedding(
        &self,
        text: &str,
        parameters: &ModelParameters,
    ) -> Result<Vec<f32>, ProviderError> {
        let model = if parameters.model_name.trim().is_empty() {
            self.default_embedding_model.as_str()
        } else {
            parameters.model_name.as_str()
        };
        let body = EmbeddingBody {
            model,
            input: text,
            dimensions: nonzero_u32(parameters.dimensions),
        };
        debug!(provider = self.spec.name, model, "Requesting embedding");

        let response = self.post(&self.embeddings_url(), &body).await?;
        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::Parse("response has no embedding data".to_string()))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::find_by_name;
    use omnigate_core::types::StreamEvent;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn configured(name: &str, pairs: &[(&str, &str)]) -> HttpProvider {
        let mut provider = HttpProvider::from_spec(find_by_name(name).unwrap());
        let config: Properties = pairs.iter().copied().collect();
        provider.initialize(&config).unwrap();
        provider
    }

    fn mocked(uri: &str) -> HttpProvider {
        configured("openai", &[("api_key", "k"), ("api_base", uri)])
    }

    fn chat_request(prompt: &str) -> ChatRequest {
        ChatRequest {
            client_id: "c1".into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    // ── Unit tests ──

    #[test]
    fn test_completions_url_trailing_slash() {
        let provider = configured("openai", &[("api_key", "k"), ("api_base", "https://api.openai.com/v1/")]);
        assert_eq!(
            provider.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(provider.embeddings_url(), "https://api.openai.com/v1/embeddings");
    }

    #[test]
    fn test_explicit_urls_override_base() {
        let provider = configured(
            "ollama",
            &[
                ("chat_url", "http://box:11434/api/chat"),
                ("embedding_url", "http://box:11434/api/embed"),
            ],
        );
        assert_eq!(provider.completions_url(), "http://box:11434/api/chat");
        assert_eq!(provider.embeddings_url(), "http://box:11434/api/embed");
    }

    #[test]
    fn test_missing_api_key_fails() {
        let mut provider = HttpProvider::from_spec(find_by_name("openai").unwrap());
        let config: Properties = [("default_lm_model", "gpt-4o")].into_iter().collect();
        let err = provider.initialize(&config).unwrap_err();
        assert!(err.to_string().contains("openai.api_key"));
    }

    #[test]
    fn test_local_provider_needs_no_key() {
        let provider = configured("ollama", &[("default_lm_model", "llama3.1")]);
        assert_eq!(provider.default_lm_model, "llama3.1");
        assert!(provider.api_key.is_empty());
    }

    #[test]
    fn test_invalid_timeout_fails() {
        let mut provider = HttpProvider::from_spec(find_by_name("openai").unwrap());
        let config: Properties = [("api_key", "k"), ("timeout_secs", "soon")]
            .into_iter()
            .collect();
        assert!(matches!(
            provider.initialize(&config),
            Err(ProviderError::Config { .. })
        ));
    }

    #[test]
    fn test_capabilities_follow_catalog() {
        let grok = configured("grok", &[("api_key", "k")]);
        assert!(grok.supports_chat());
        assert!(!grok.supports_embeddings());
        assert!(grok.as_chat().is_some());
        assert!(grok.as_embedding().is_none());
        assert_eq!(grok.service_level(), ServiceLevel::Level2);
    }

    #[test]
    fn test_zero_parameters_are_omitted() {
        let provider = configured("openai", &[("api_key", "k")]);
        let mut req = chat_request("hi");
        req.parameters.temperature = 0.3;
        let body = serde_json::to_value(provider.completion_body(&req, false)).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("top_p").is_none());
        assert!(body.get("stream").is_none());
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_sse_line_parsing() {
        assert!(matches!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#).unwrap(),
            SseLine::Token(ref t) if t == "Hi"
        ));
        assert!(matches!(parse_sse_line("data: [DONE]").unwrap(), SseLine::Done));
        assert!(matches!(parse_sse_line(": keep-alive").unwrap(), SseLine::Skip));
        assert!(matches!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap(),
            SseLine::Skip
        ));
        assert!(parse_sse_line("data: {broken").is_err());
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_chat_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "max_tokens": 50
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-test",
                "choices": [{
                    "message": { "content": "  Hello from the gateway.  " },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let provider = configured(
            "openai",
            &[("api_key", "test-key-123"), ("api_base", uri.as_str())],
        );
        let mut req = chat_request("Hello");
        req.model_name = "gpt-4o".into();
        req.parameters.max_tokens = 50;

        let completion = provider.generate_chat_response(&req).await.unwrap();
        assert_eq!(completion, "Hello from the gateway.");
    }

    #[tokio::test]
    async fn test_chat_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "message": "Rate limit exceeded" }
            })))
            .mount(&mock_server)
            .await;

        let provider = mocked(&mock_server.uri());
        let err = provider
            .generate_chat_response(&chat_request("Hello"))
            .await
            .unwrap_err();

        match err {
            ProviderError::Api { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("Rate limit"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_network_error() {
        // Point to a port that's not listening
        let provider = configured("openai", &[("api_key", "k"), ("api_base", "http://127.0.0.1:1")]);
        let err = provider
            .generate_chat_response(&chat_request("Hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Http(_)));
    }

    #[tokio::test]
    async fn test_stream_tokens_in_order() {
        let mock_server = MockServer::start().await;

        let sse = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"The\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" cat\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({ "stream": true })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
            .mount(&mock_server)
            .await;

        let provider = mocked(&mock_server.uri());
        let (sink, mut rx) = TokenSink::channel(16);
        provider
            .stream_chat_response(&chat_request("Tell me"), &sink)
            .await
            .unwrap();
        drop(sink);

        let mut events = Vec::new();
        while let Some(ev) = rx.recv().await {
            events.push(ev);
        }
        assert_eq!(
            events,
            vec![
                StreamEvent::Token("The".into()),
                StreamEvent::Token(" cat".into()),
                StreamEvent::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_keeps_final_line_without_newline() {
        let mock_server = MockServer::start().await;

        let sse = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"The\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" end\"}}]}",
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
            .mount(&mock_server)
            .await;

        let provider = mocked(&mock_server.uri());
        let (sink, mut rx) = TokenSink::channel(16);
        provider
            .stream_chat_response(&chat_request("Tell me"), &sink)
            .await
            .unwrap();
        drop(sink);

        let mut events = Vec::new();
        while let Some(ev) = rx.recv().await {
            events.push(ev);
        }
        assert_eq!(
            events,
            vec![
                StreamEvent::Token("The".into()),
                StreamEvent::Token(" end".into()),
                StreamEvent::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_stops_when_caller_leaves() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\n",
                "text/event-stream",
            ))
            .mount(&mock_server)
            .await;

        let provider = mocked(&mock_server.uri());
        let (sink, rx) = TokenSink::channel(1);
        drop(rx);

        let err = provider
            .stream_chat_response(&chat_request("x"), &sink)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled));
    }

    #[tokio::test]
    async fn test_stream_api_error_propagates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&mock_server)
            .await;

        let provider = mocked(&mock_server.uri());
        let (sink, _rx) = TokenSink::channel(4);
        let err = provider
            .stream_chat_response(&chat_request("x"), &sink)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 500, .. }));
        assert!(!sink.is_terminated());
    }

    #[tokio::test]
    async fn test_embedding_success_uses_default_model() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_partial_json(serde_json::json!({
                "model": "text-embedding-3-small",
                "input": "Mickey Mouse"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "embedding": [0.1, 0.2, 0.3], "index": 0 }]
            })))
            .mount(&mock_server)
            .await;

        let provider = mocked(&mock_server.uri());
        let embedding = provider
            .generate_embedding("Mickey Mouse", &ModelParameters::default())
            .await
            .unwrap();
        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embedding_empty_data_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })))
            .mount(&mock_server)
            .await;

        let provider = mocked(&mock_server.uri());
        let err = provider
            .generate_embedding("x", &ModelParameters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let provider = configured("openai", &[("api_key", "sk-secret")]);
        let debug = format!("{provider:?}");
        assert!(debug.contains("OpenAI"));
        assert!(!debug.contains("sk-secret"));
        assert_eq!(provider.display_name(), "OpenAI");
    }
}
