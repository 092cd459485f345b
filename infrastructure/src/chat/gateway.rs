//! Chat completion gateway implementation

use super::protocol::{ChatRequest, ChatResponse, ErrorEnvelope};
use crate::config::FileProviderConfig;
use async_trait::async_trait;
use quiz_application::ports::completion_gateway::{
    CompletionGateway, GatewayError, KEY_PROBE_PROMPT, KEY_PROBE_SYSTEM, KeyStatus,
};
use quiz_domain::ApiKey;
use quiz_domain::core::string::truncate;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Longest raw error body quoted back in a service error
const MAX_ERROR_BODY: usize = 300;

/// Endpoint settings for [`ChatCompletionGateway`]
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletionConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout: Duration,
    pub validation_timeout: Duration,
}

impl Default for ChatCompletionConfig {
    fn default() -> Self {
        Self::from_file(&FileProviderConfig::default())
    }
}

impl ChatCompletionConfig {
    pub fn from_file(config: &FileProviderConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            request_timeout: Duration::from_secs(config.request_timeout_seconds.max(1)),
            validation_timeout: Duration::from_secs(config.validation_timeout_seconds.max(1)),
        }
    }
}

/// Completion gateway for OpenAI-compatible chat endpoints
pub struct ChatCompletionGateway {
    client: reqwest::Client,
    config: ChatCompletionConfig,
}

impl ChatCompletionGateway {
    pub fn new(config: ChatCompletionConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ai-quiz/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Network(format!("HTTP client setup failed: {}", e)))?;

        info!(
            "ChatCompletionGateway initialized ({} via {})",
            config.model, config.base_url
        );
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ChatCompletionConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn send(
        &self,
        system: &str,
        prompt: &str,
        key: &ApiKey,
        temperature: f32,
        timeout: Duration,
    ) -> Result<String, GatewayError> {
        let body = ChatRequest::new(&self.config.model, system, prompt, temperature);
        debug!("POST {} ({} prompt bytes)", self.endpoint(), prompt.len());

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(key.expose())
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(e, timeout))?;
        debug!("HTTP {} with {} body bytes", status.as_u16(), text.len());

        interpret(status, &text)
    }
}

/// Map a transport-level failure. Everything here is a network problem.
fn transport_error(e: reqwest::Error, timeout: Duration) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Network(format!("request timed out after {:?}", timeout))
    } else if e.is_connect() {
        GatewayError::Network(format!("could not connect: {}", e))
    } else {
        GatewayError::Network(e.to_string())
    }
}

/// Map an HTTP status and body to completion text or a gateway error.
fn interpret(status: StatusCode, body: &str) -> Result<String, GatewayError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        warn!("Completion endpoint rejected the API key (HTTP {})", status.as_u16());
        return Err(GatewayError::Auth(format!(
            "HTTP {}: {}",
            status.as_u16(),
            error_message(body)
        )));
    }

    if !status.is_success() {
        return Err(GatewayError::Service {
            status: status.as_u16(),
            message: error_message(body),
        });
    }

    serde_json::from_str::<ChatResponse>(body)
        .map_err(|e| GatewayError::MalformedResponse(format!("invalid JSON: {}", e)))?
        .into_content()
        .ok_or_else(|| {
            GatewayError::MalformedResponse("no choices[0].message.content in response".into())
        })
}

/// The provider's `error.message`, or the raw body cut to a readable size.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => truncate(body.trim(), MAX_ERROR_BODY),
    }
}

#[async_trait]
impl CompletionGateway for ChatCompletionGateway {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        key: &ApiKey,
    ) -> Result<String, GatewayError> {
        self.send(
            system,
            prompt,
            key,
            self.config.temperature,
            self.config.request_timeout,
        )
        .await
    }

    async fn validate_key(&self, key: &ApiKey) -> KeyStatus {
        let result = self
            .send(
                KEY_PROBE_SYSTEM,
                KEY_PROBE_PROMPT,
                key,
                0.0,
                self.config.validation_timeout,
            )
            .await;
        if let Err(e) = &result {
            debug!("Key check failed: {}", e);
        }
        KeyStatus::from_check(&result)
    }
}
