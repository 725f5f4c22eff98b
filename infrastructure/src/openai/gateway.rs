//! OpenAI-compatible backend gateway

use super::error::{OpenAiError, Result};
use super::protocol::{
    ApiErrorBody, ChatCompletionRequest, ChatCompletionResponse, ModelList,
};
use async_trait::async_trait;
use roundtable_application::{BackendGateway, Completion, CompletionRequest, GatewayError};
use roundtable_domain::Model;
use std::time::Duration;
use tracing::{debug, info};

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL including the version prefix, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub api_key: String,
    /// HTTP-level timeout; `None` uses the client default
    pub timeout: Option<Duration>,
}

/// Backend gateway speaking the OpenAI chat-completions protocol
pub struct OpenAiGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiGateway {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(OpenAiError::MissingApiKey);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        info!("OpenAI-compatible gateway initialized for {}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Turn a non-2xx response into [`OpenAiError::Status`], preferring the
    /// message from the error envelope.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| {
                if body.is_empty() {
                    status.canonical_reason().unwrap_or("Unknown").to_string()
                } else {
                    body
                }
            });
        Err(OpenAiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn chat_completion(&self, request: &CompletionRequest) -> Result<Completion> {
        let body = ChatCompletionRequest {
            model: request.model.as_str(),
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let text = response.text().await?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| OpenAiError::Parse(e.to_string()))?;
        let content = parsed
            .first_content()
            .ok_or(OpenAiError::EmptyChoices)?
            .to_string();

        debug!(
            "{} returned {} chars (usage reported: {})",
            request.model,
            content.len(),
            parsed.usage.is_some()
        );

        let completion = Completion::new(content);
        Ok(match parsed.usage {
            Some(usage) => completion.with_usage(usage.into()),
            None => completion,
        })
    }

    async fn list_models(&self) -> Result<Vec<Model>> {
        let response = self
            .client
            .get(self.endpoint("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let list: ModelList = response
            .json()
            .await
            .map_err(|e| OpenAiError::Parse(e.to_string()))?;

        let mut models: Vec<Model> = list
            .data
            .into_iter()
            .filter_map(|entry| Model::try_new(entry.id))
            .collect();
        models.sort();
        models.dedup();
        Ok(models)
    }
}

#[async_trait]
impl BackendGateway for OpenAiGateway {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<Completion, GatewayError> {
        self.chat_completion(&request).await.map_err(Into::into)
    }

    async fn available_models(&self) -> std::result::Result<Vec<Model>, GatewayError> {
        self.list_models().await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::{ChatMessage, TokenUsage};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> OpenAiGateway {
        OpenAiGateway::new(OpenAiConfig {
            base_url: format!("{}/v1/", server.uri()),
            api_key: "sk-test".to_string(),
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: Model::try_new("gpt-4o").unwrap(),
            messages: vec![ChatMessage::user("Hello")],
            temperature: 0.5,
            max_tokens: 64,
        }
    }

    #[test]
    fn test_rejects_blank_api_key() {
        let result = OpenAiGateway::new(OpenAiConfig {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: "  ".to_string(),
            timeout: None,
        });
        assert!(matches!(result, Err(OpenAiError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_complete_parses_content_and_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Hi there"}}],
                "usage": {"prompt_tokens": 9, "completion_tokens": 2, "total_tokens": 11}
            })))
            .mount(&server)
            .await;

        let completion = gateway(&server).complete(request()).await.unwrap();

        assert_eq!(completion.content, "Hi there");
        assert_eq!(completion.usage, Some(TokenUsage::new(9, 2)));
    }

    #[tokio::test]
    async fn test_error_envelope_becomes_gateway_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"message": "The model `gpt-4o` does not exist"}
            })))
            .mount(&server)
            .await;

        let err = gateway(&server).complete(request()).await.unwrap_err();

        assert_eq!(
            err,
            GatewayError::ModelNotAvailable("The model `gpt-4o` does not exist".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = gateway(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_available_models_sorted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [{"id": "qwen-max"}, {"id": "deepseek-chat"}, {"id": "gpt-4o"}]
            })))
            .mount(&server)
            .await;

        let models = gateway(&server).available_models().await.unwrap();
        let ids: Vec<_> = models.iter().map(Model::as_str).collect();
        assert_eq!(ids, vec!["deepseek-chat", "gpt-4o", "qwen-max"]);
    }
}
