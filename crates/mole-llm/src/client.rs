//! Chat clients for the hosted providers

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::debug;

use mole_core::{Error, GenerationRequest, GenerationResult, Result, TextGenerator};

use crate::config::{LlmConfig, ProviderKind};

/// Client for OpenAI-style `/chat/completions` endpoints (OpenAI, Groq,
/// Hugging Face router)
pub struct OpenAiCompatibleClient {
    config: LlmConfig,
    client: Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

impl OpenAiCompatibleClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        config.validate()?;
        let client = http_client(&config, bearer_headers(&config.api_key)?)?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        Ok(Self {
            config,
            client,
            endpoint,
        })
    }

    pub(crate) fn body<'a>(&'a self, request: &'a GenerationRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &self.config.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    async fn perform_generation(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        debug!("POST {} ({})", self.endpoint, self.config.model);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.body(request))
            .send()
            .await
            .map_err(|e| request_error(self.config.provider, e))?;

        let body = read_body(self.config.provider, response).await?;
        parse_chat_response(&body, &self.config.model)
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        match timeout(self.config.timeout(), self.perform_generation(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Generation(format!(
                "{} request timed out after {}s",
                self.config.provider, self.config.timeout_secs
            ))),
        }
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

pub(crate) fn parse_chat_response(body: &str, requested_model: &str) -> Result<GenerationResult> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| Error::Generation(format!("malformed completion response: {}", e)))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::Generation("completion response has no choices".to_string()))?;

    Ok(GenerationResult {
        text: choice.message.content.unwrap_or_default(),
        model_id: parsed.model.unwrap_or_else(|| requested_model.to_string()),
        tokens_used: parsed.usage.map(|usage| usage.total_tokens),
    })
}

/// Client for Anthropic's `/messages` endpoint
pub struct AnthropicClient {
    config: LlmConfig,
    client: Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    model: Option<String>,
    content: Vec<AnthropicBlock>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicClient {
    pub const API_VERSION: &'static str = "2023-06-01";

    pub fn new(config: LlmConfig) -> Result<Self> {
        config.validate()?;
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(config.api_key.trim())
                .map_err(|_| Error::Configuration("invalid Anthropic API key".to_string()))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(Self::API_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = http_client(&config, headers)?;
        let endpoint = format!("{}/messages", config.base_url.trim_end_matches('/'));
        Ok(Self {
            config,
            client,
            endpoint,
        })
    }

    pub(crate) fn body<'a>(&'a self, request: &'a GenerationRequest) -> AnthropicRequest<'a> {
        AnthropicRequest {
            model: &self.config.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system.as_deref(),
            messages: vec![AnthropicMessage {
                role: "user",
                content: &request.prompt,
            }],
        }
    }

    async fn perform_generation(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        debug!("POST {} ({})", self.endpoint, self.config.model);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.body(request))
            .send()
            .await
            .map_err(|e| request_error(self.config.provider, e))?;

        let body = read_body(self.config.provider, response).await?;
        parse_anthropic_response(&body, &self.config.model)
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        match timeout(self.config.timeout(), self.perform_generation(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Generation(format!(
                "anthropic request timed out after {}s",
                self.config.timeout_secs
            ))),
        }
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

pub(crate) fn parse_anthropic_response(body: &str, requested_model: &str) -> Result<GenerationResult> {
    let parsed: AnthropicResponse = serde_json::from_str(body)
        .map_err(|e| Error::Generation(format!("malformed messages response: {}", e)))?;

    let text = parsed
        .content
        .into_iter()
        .filter_map(|block| match block {
            AnthropicBlock::Text { text } => Some(text),
            AnthropicBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(GenerationResult {
        text,
        model_id: parsed.model.unwrap_or_else(|| requested_model.to_string()),
        tokens_used: parsed
            .usage
            .map(|usage| usage.input_tokens + usage.output_tokens),
    })
}

/// Build the generator for the configured provider
pub fn build_generator(config: LlmConfig) -> Result<Arc<dyn TextGenerator>> {
    Ok(match config.provider {
        ProviderKind::Anthropic => Arc::new(AnthropicClient::new(config)?),
        ProviderKind::OpenAi | ProviderKind::Groq | ProviderKind::HuggingFace => {
            Arc::new(OpenAiCompatibleClient::new(config)?)
        }
    })
}

pub(crate) fn bearer_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let auth = format!("Bearer {}", api_key.trim());
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&auth)
            .map_err(|_| Error::Configuration("API key contains invalid characters".to_string()))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

fn http_client(config: &LlmConfig, headers: HeaderMap) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Configuration(format!("failed to build {} HTTP client: {}", config.provider, e)))
}

fn request_error(provider: ProviderKind, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Generation(format!("{} request timed out", provider))
    } else {
        Error::Generation(format!("{} is unavailable: {}", provider, err))
    }
}

/// Read a successful response body or turn the failure status into an error
pub(crate) async fn read_body(provider: ProviderKind, response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Generation(format!("failed to read {} response: {}", provider, e)))?;

    if status.is_success() {
        return Ok(body);
    }
    Err(status_error(provider, status, &body))
}

pub(crate) fn status_error(provider: ProviderKind, status: StatusCode, body: &str) -> Error {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            Error::Generation(format!("{} rate limit reached, try again later", provider))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Configuration(format!(
            "{} rejected the API key ({})",
            provider, status
        )),
        _ => Error::Generation(format!("{} returned {}: {}", provider, status, body.trim())),
    }
}
