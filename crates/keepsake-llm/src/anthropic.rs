// Anthropic messages client (HTTP direct, no SDK)

use std::pin::Pin;

use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;

use crate::assembler::{assemble_message_stream, Transcript};
use crate::error::{LlmError, Result};
use crate::streaming::{parse_message_stream, StreamEvent};
use crate::types::ChatMessage;

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// A `/v1/messages` request: the prior conversation plus an optional system
/// prompt carried out-of-band.
#[derive(Debug, Clone)]
pub struct MessagesRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub system: Option<String>,
    pub max_tokens: u32,
}

impl MessagesRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            system: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

pub struct AnthropicClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl AnthropicClient {
    /// Create new client with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&api_key)
                .map_err(|_| LlmError::Config("invalid API key format".to_string()))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: ANTHROPIC_API_BASE.to_string(),
        })
    }

    /// Override the API base URL (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_payload(&self, request: &MessagesRequest, stream: bool) -> Value {
        let mut payload = serde_json::json!({
            "model": &request.model,
            "max_tokens": request.max_tokens,
            "messages": &request.messages,
            "stream": stream,
        });
        if let Some(system) = &request.system {
            payload
                .as_object_mut()
                .expect("payload is an object")
                .insert("system".to_string(), serde_json::json!(system));
        }
        payload
    }

    async fn post_messages(&self, request: &MessagesRequest, stream: bool) -> Result<reqwest::Response> {
        let payload = self.build_payload(request, stream);

        let response = self
            .http_client
            .post(format!("{}/messages", self.base_url))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "anthropic request rejected");
            return Err(LlmError::Upstream { status, message });
        }

        Ok(response)
    }

    /// Non-streaming completion: the reply's text blocks, concatenated.
    pub async fn messages(&self, request: &MessagesRequest) -> Result<String> {
        let response = self.post_messages(request, false).await?;
        let raw: MessagesResponse = response.json().await?;

        Ok(raw
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect())
    }

    /// Streaming completion as discrete events.
    pub async fn messages_stream(
        &self,
        request: &MessagesRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>> {
        let response = self.post_messages(request, true).await?;
        Ok(parse_message_stream(response))
    }

    /// Streaming completion folded into a transcript: every delta updates the
    /// caller's placeholder entry, and the final assembled reply is returned.
    pub async fn stream_into<T: Transcript>(
        &self,
        request: &MessagesRequest,
        transcript: &mut T,
    ) -> Result<String> {
        let response = self.post_messages(request, true).await?;
        assemble_message_stream(response, transcript).await
    }
}

#[derive(Debug, Clone, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}
