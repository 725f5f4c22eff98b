//! Backend gateway port
//!
//! Defines the interface for calling a chat-completion backend. The gateway is
//! stateless: every call carries the full message list for one participant.

use async_trait::async_trait;
use roundtable_domain::{ChatMessage, Model, TokenUsage};
use thiserror::Error;

/// Errors that can occur during a backend call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// One chat-completion call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: Model,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    /// Cap on generated tokens
    pub max_tokens: u32,
}

/// Generated text plus the usage the backend reported, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

impl Completion {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Gateway for chat-completion backends
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Run one completion
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, GatewayError>;

    /// Models the backend can serve
    async fn available_models(&self) -> Result<Vec<Model>, GatewayError>;
}
