//! OpenAI-compatible chat completions client.
//!
//! Structured outputs use the `response_format: json_schema` contract; the
//! completion text is still run through the lenient JSON extractor because
//! some compatible backends wrap the object in a code fence anyway.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{extract_json, Generator};
use crate::config::{OpenAiConfig, RetryConfig};
use crate::error::{ConfigError, ModelError};
use crate::retry::retry_with_backoff;

const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub struct OpenAiGenerator {
    api_key: String,
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
    retry: RetryConfig,
}

impl OpenAiGenerator {
    pub fn new(api_key: impl Into<String>, config: &OpenAiConfig) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryConfig::default(),
        }
    }

    /// Create from the OPENAI_API_KEY environment variable.
    pub fn from_env(config: &OpenAiConfig) -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnv("OPENAI_API_KEY"))?;
        Ok(Self::new(api_key, config))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, ModelError> {
        let response = retry_with_backoff(&self.retry, || self.complete_once(request)).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ModelError::EmptyCompletion)?;

        let content = choice.message.content.unwrap_or_default();
        if content.is_empty() {
            return Err(ModelError::EmptyCompletion);
        }
        Ok(content)
    }

    async fn complete_once(&self, request: &ChatRequest) -> Result<ChatResponse, ModelError> {
        debug!(model = %self.model, "Requesting chat completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout
                } else if e.is_connect() {
                    ModelError::Connection(e.to_string())
                } else {
                    ModelError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| ModelError::MalformedResponse(e.to_string()));
        }

        let error_text = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => Err(ModelError::Unauthorized),
            429 => Err(ModelError::RateLimited),
            400 => Err(ModelError::BadRequest(error_text)),
            500..=599 => Err(ModelError::ServerError(status.as_u16(), error_text)),
            _ => Err(ModelError::Http(status.as_u16(), error_text)),
        }
    }

    fn request(&self, system: &str, user: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            response_format: None,
        }
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(&self, system: &str, user: &str) -> Result<String, ModelError> {
        self.complete(&self.request(system, user)).await
    }

    async fn generate_json(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, ModelError> {
        let mut request = self.request(system, user);
        request.response_format = Some(json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema_name,
                "schema": schema,
            }
        }));

        let content = self.complete(&request).await?;

        let raw = extract_json(&content).ok_or_else(|| ModelError::SchemaViolation {
            name: schema_name.to_string(),
            detail: "completion contained no JSON object".to_string(),
        })?;

        serde_json::from_str(&raw).map_err(|e| ModelError::SchemaViolation {
            name: schema_name.to_string(),
            detail: e.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator(base_url: String) -> OpenAiGenerator {
        let config = OpenAiConfig {
            base_url,
            model: "gpt-4.1".to_string(),
            temperature: 0.0,
        };
        OpenAiGenerator::new("test-key", &config)
            .with_timeout(Duration::from_secs(5))
            .with_retry(RetryConfig {
                max_attempts: 1,
                backoff_base_ms: 10,
            })
    }

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "choices": [
                {"message": {"role": "assistant", "content": content}}
            ]
        })
    }

    #[tokio::test]
    async fn test_generate_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("## Section\n\nText.")),
            )
            .mount(&server)
            .await;

        let model = generator(server.uri());
        let content = model.generate("system", "user").await.unwrap();
        assert_eq!(content, "## Section\n\nText.");
    }

    #[tokio::test]
    async fn test_generate_json_unwraps_code_fence() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                "```json\n{\"queries\": [{\"search_query\": \"tariffs 2026\"}]}\n```",
            )))
            .mount(&server)
            .await;

        let model = generator(server.uri());
        let schema = json!({"type": "object"});
        let value = model
            .generate_json("system", "user", "SearchQueries", &schema)
            .await
            .unwrap();
        assert_eq!(value["queries"][0]["search_query"], "tariffs 2026");
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let model = generator(server.uri()).with_retry(RetryConfig {
            max_attempts: 3,
            backoff_base_ms: 10,
        });

        let result = model.generate("system", "user").await;
        assert!(matches!(result, Err(ModelError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .mount(&server)
            .await;

        let model = generator(server.uri()).with_retry(RetryConfig {
            max_attempts: 3,
            backoff_base_ms: 10,
        });

        let content = model.generate("system", "user").await.unwrap();
        assert_eq!(content, "ok");
    }

    #[tokio::test]
    async fn test_empty_completion() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let model = generator(server.uri());
        let result = model.generate("system", "user").await;
        assert!(matches!(result, Err(ModelError::EmptyCompletion)));
    }

    #[tokio::test]
    async fn test_non_json_structured_completion() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("no json at all")),
            )
            .mount(&server)
            .await;

        let model = generator(server.uri());
        let schema = json!({"type": "object"});
        let result = model
            .generate_json("system", "user", "SectionPlan", &schema)
            .await;
        assert!(matches!(
            result,
            Err(ModelError::SchemaViolation { ref name, .. }) if name == "SectionPlan"
        ));
    }
}
