//! Transport to the generative-language service.
//!
//! [`Transport`] is the seam the stream consumer talks to. [`GeminiTransport`]
//! implements it with `reqwest`, posting to
//! `{base}/models/{model}:streamGenerateContent?alt=sse` and decoding the SSE
//! body into [`Fragment`]s.
//!
//! The API key travels in the `x-goog-api-key` header. It never appears in
//! the URL or in logs.

use std::pin::Pin;

use async_trait::async_trait;
use chota_core::config::DEFAULT_API_BASE_URL;
use chota_core::text::truncate_with_suffix;
use futures::{Stream, StreamExt};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, error, instrument};

use crate::errors::{ChatError, Result};
use crate::options::GenerationOptions;
use crate::projector::ChatRequest;
use crate::sse::parse_sse_lines;
use crate::stream_handler::{Fragment, fragment_from_chunk};
use crate::types::{GeminiErrorEnvelope, GeminiStreamChunk, GenerateContentRequest};

/// Boxed stream of [`Fragment`]s returned by [`Transport::open`].
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment>> + Send>>;

/// Something that can open a streaming completion.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return its fragments in arrival order.
    async fn open(
        &self,
        credential: &str,
        request: &ChatRequest,
        options: &GenerationOptions,
    ) -> Result<FragmentStream>;
}

/// Build the JSON body for a request.
pub fn build_request_body(request: &ChatRequest, options: &GenerationOptions) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: request.contents(),
        generation_config: options.wire_generation_config(),
        system_instruction: options.wire_system_instruction(),
        tools: options.wire_tools(),
    }
}

/// Gemini API transport over HTTP.
#[derive(Clone, Debug)]
pub struct GeminiTransport {
    client: reqwest::Client,
    base_url: String,
}

impl Default for GeminiTransport {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl GeminiTransport {
    /// Create a transport against the given API root.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a transport with a shared HTTP client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// API root in use.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Streaming endpoint for a model.
    fn api_url(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:streamGenerateContent?alt=sse",
            self.base_url
        )
    }

    fn build_headers(credential: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(credential)
            .map_err(|_| ChatError::InvalidRequest("API key is not a valid header value".into()))?;
        key.set_sensitive(true);
        let _ = headers.insert("x-goog-api-key", key);
        Ok(headers)
    }
}

#[async_trait]
impl Transport for GeminiTransport {
    #[instrument(skip_all, fields(model = %options.model_id))]
    async fn open(
        &self,
        credential: &str,
        request: &ChatRequest,
        options: &GenerationOptions,
    ) -> Result<FragmentStream> {
        let headers = Self::build_headers(credential)?;
        let body = build_request_body(request, options);

        debug!(
            contents = body.contents.len(),
            search = options.has_search(),
            thinking = options.thinking.is_some(),
            "sending streamGenerateContent"
        );

        let response = self
            .client
            .post(self.api_url(&options.model_id))
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            let body_text = response.text().await.unwrap_or_default();
            let err = parse_api_error(status.as_u16(), &body_text, retry_after_ms);
            error!(status = status.as_u16(), category = err.category(), "Gemini API error");
            return Err(err);
        }

        let fragments = parse_sse_lines(response.bytes_stream()).map(|line| -> Result<Fragment> {
            let line = line?;
            let chunk: GeminiStreamChunk = serde_json::from_str(&line)?;
            fragment_from_chunk(&chunk)
        });

        Ok(Box::pin(fragments))
    }
}

/// Raw error bodies are cut to this many bytes in messages.
const MAX_ERROR_BODY: usize = 512;

/// Map a non-2xx response onto a [`ChatError`].
fn parse_api_error(status: u16, body: &str, retry_after_ms: Option<u64>) -> ChatError {
    let (message, code) = match serde_json::from_str::<GeminiErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.message, envelope.error.status),
        Err(_) => (
            format!(
                "HTTP {status}: {}",
                truncate_with_suffix(body.trim(), MAX_ERROR_BODY, "...")
            ),
            None,
        ),
    };
    if status == 429 {
        return ChatError::RateLimited {
            retry_after_ms,
            message,
        };
    }
    ChatError::Api {
        status,
        message,
        code,
    }
}

/// Parse a `Retry-After` header given in seconds.
fn parse_retry_after(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().map(|s| s * 1000)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
