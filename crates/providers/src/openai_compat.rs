//! OpenAI-compatible provider implementation.
//!
//! Talks to any endpoint exposing `/chat/completions` in the OpenAI wire
//! format: OpenAI itself, Azure-style proxies, vLLM, Ollama. Only complete
//! (non-streaming) replies are requested; each call is a single attempt.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use splitscore_config::AppConfig;
use splitscore_core::error::ProviderError;
use splitscore_core::message::{Message, Role};
use splitscore_core::provider::*;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// An OpenAI-compatible LLM provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    organization: Option<String>,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            organization: None,
            client: build_client(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build a provider from the application config.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            ProviderError::NotConfigured("no API key set (OPENAI_API_KEY)".into())
        })?;

        let mut provider = Self::new("openai", config.api_url.as_str(), api_key)
            .with_timeout(Duration::from_secs(config.request_timeout_secs));
        if let Some(org) = &config.organization {
            provider = provider.with_organization(org.as_str());
        }
        Ok(provider)
    }

    /// Send `OpenAI-Organization` with every request.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Replace the HTTP client with one using `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout.as_secs().max(1));
        self
    }

    /// Convert our Message types to OpenAI API format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str().into(),
                content: Some(m.content.clone()),
            })
            .collect()
    }

    fn request_body(request: &ProviderRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }
}

fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Read a `Retry-After` header given in delay-seconds; HTTP dates are ignored.
fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Map a non-success HTTP status to a provider error.
fn status_error(status: u16, retry_after_secs: Option<u64>, body: String) -> ProviderError {
    match status {
        429 => ProviderError::RateLimited { retry_after_secs },
        401 | 403 => ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ),
        _ => ProviderError::ApiError {
            status_code: status,
            message: body,
        },
    }
}

/// Turn a decoded API response into our response type.
fn into_provider_response(api_response: ApiResponse) -> Result<ProviderResponse, ProviderError> {
    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ApiError {
            status_code: 200,
            message: "No choices in response".into(),
        })?;

    let message = Message {
        id: uuid::Uuid::new_v4().to_string(),
        role: Role::Assistant,
        content: choice.message.content.unwrap_or_default(),
        timestamp: chrono::Utc::now(),
    };

    let usage = api_response.usage.map(|u| Usage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    Ok(ProviderResponse {
        message,
        usage,
        model: api_response.model,
    })
}

#[async_trait]
impl splitscore_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(&request);

        debug!(provider = %self.name, model = %request.model, messages = request.messages.len(), "Sending completion request");

        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if let Some(org) = &self.organization {
            builder = builder.header("OpenAI-Organization", org);
        }

        let response = builder
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let retry_after = retry_after_secs(response.headers());
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, ?retry_after, body = %error_body, "Provider returned error");
            return Err(status_error(status, retry_after, error_body));
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        into_provider_response(api_response)
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
