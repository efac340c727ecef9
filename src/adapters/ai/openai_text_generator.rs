//! OpenAI-compatible text generator.
//!
//! Talks to any `/chat/completions` endpoint (OpenAI, Azure-style proxies,
//! local gateways). Retries rate limits and 5xx responses with exponential
//! backoff; everything else is returned to the caller, which falls back to
//! its template.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gpt-4o-mini")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let generator = OpenAITextGenerator::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{ChatRole, GenerationRequest, TextGenerationError, TextGenerator};

/// Configuration for the OpenAI-compatible generator.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Retries on rate limits and server errors.
    pub max_retries: u32,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(20),
            max_retries: 1,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Text generator backed by an OpenAI-compatible chat completions API.
pub struct OpenAITextGenerator {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAITextGenerator {
    pub fn new(config: OpenAIConfig) -> Result<Self, TextGenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TextGenerationError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_openai_request(&self, request: &GenerationRequest) -> OpenAIRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(prompt) = &request.system_prompt {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: prompt.clone(),
            });
        }
        for msg in &request.messages {
            messages.push(OpenAIMessage {
                role: match msg.role {
                    ChatRole::System => "system",
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content.clone(),
            });
        }

        OpenAIRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn send_request(&self, request: &GenerationRequest) -> Result<Response, TextGenerationError> {
        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(&self.to_openai_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TextGenerationError::Timeout(self.config.timeout.as_secs())
                } else {
                    TextGenerationError::Network(e.to_string())
                }
            })
    }

    async fn parse_response(&self, response: Response) -> Result<String, TextGenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => TextGenerationError::AuthenticationFailed,
                429 => TextGenerationError::RateLimited,
                500..=599 => TextGenerationError::Unavailable(format!("{}: {}", status, body)),
                _ => TextGenerationError::Parse(format!("unexpected status {}: {}", status, body)),
            });
        }

        let parsed: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| TextGenerationError::Parse(format!("failed to parse response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(TextGenerationError::EmptyResponse);
        }
        Ok(content)
    }

    fn is_retryable(err: &TextGenerationError) -> bool {
        matches!(
            err,
            TextGenerationError::RateLimited | TextGenerationError::Unavailable(_)
        )
    }
}

#[async_trait]
impl TextGenerator for OpenAITextGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, TextGenerationError> {
        let mut retry_count = 0;
        loop {
            let result = match self.send_request(&request).await {
                Ok(response) => self.parse_response(response).await,
                Err(err) => Err(err),
            };

            match result {
                Ok(text) => return Ok(text),
                Err(err) if Self::is_retryable(&err) && retry_count < self.config.max_retries => {
                    tracing::debug!(error = %err, retry_count, "text generation failed, retrying");
                    // Exponential backoff: 500ms, 1s, 2s, ...
                    sleep(Duration::from_millis(500 << retry_count.min(6))).await;
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ChatMessage;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator(server: &MockServer) -> OpenAITextGenerator {
        OpenAITextGenerator::new(
            OpenAIConfig::new("test-key")
                .with_base_url(server.uri())
                .with_max_retries(0),
        )
        .unwrap()
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
    }

    #[test]
    fn config_builder_works() {
        let config = OpenAIConfig::new("test-key")
            .with_model("gpt-4o")
            .with_base_url("https://custom.api.com/")
            .with_timeout(Duration::from_secs(5))
            .with_max_retries(2);

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "https://custom.api.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn request_puts_system_prompt_first() {
        let generator = OpenAITextGenerator::new(OpenAIConfig::new("k")).unwrap();
        let request = GenerationRequest::new()
            .with_system_prompt("be brief")
            .with_message(ChatMessage::user("hi"));
        let body = generator.to_openai_request(&request);

        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].role, "system");
        assert_eq!(body.messages[1].content, "hi");
    }

    #[tokio::test]
    async fn returns_trimmed_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("  Hello there!\n")))
            .mount(&server)
            .await;

        let text = generator(&server).generate(GenerationRequest::new()).await.unwrap();
        assert_eq!(text, "Hello there!");
    }

    #[tokio::test]
    async fn empty_content_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
            .mount(&server)
            .await;

        let err = generator(&server).generate(GenerationRequest::new()).await.unwrap_err();
        assert_eq!(err, TextGenerationError::EmptyResponse);
    }

    #[tokio::test]
    async fn maps_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = generator(&server).generate(GenerationRequest::new()).await.unwrap_err();
        assert_eq!(err, TextGenerationError::AuthenticationFailed);
    }

    #[tokio::test]
    async fn retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
            .mount(&server)
            .await;

        let generator = OpenAITextGenerator::new(
            OpenAIConfig::new("test-key").with_base_url(server.uri()).with_max_retries(1),
        )
        .unwrap();
        assert_eq!(generator.generate(GenerationRequest::new()).await.unwrap(), "ok");
    }
}
