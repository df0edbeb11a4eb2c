//! Model provider abstraction and implementations.
//!
//! Generation goes through the [`TextProvider`] trait so the hosted model
//! can be swapped (Bedrock in production, a mock for local runs and tests).

pub mod bedrock;
pub mod bedrock_api_key;
pub mod mock;

pub use bedrock::{BedrockProvider, BedrockSdkConfig};
pub use bedrock_api_key::{BedrockApiKeyConfig, BedrockApiKeyProvider};
pub use mock::MockProvider;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// Error reported by the provider itself, e.g. `AccessDeniedException`.
    #[error("API error {code}: {message}")]
    ApiError { code: String, message: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Provider reply contained no text")]
    EmptyResponse,
}

impl ProviderError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError { .. } => "api_error",
            ProviderError::RateLimited(_) => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::NetworkError(_) => "network_error",
            ProviderError::EmptyResponse => "empty_response",
        }
    }
}

/// Result of a provider call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Raw generated text.
    pub text: String,

    /// Input tokens consumed.
    pub input_tokens: u32,

    /// Output tokens generated.
    pub output_tokens: u32,

    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::Complete => "complete",
            FinishReason::Length => "length",
            FinishReason::ContentFilter => "content_filter",
        }
    }
}

/// Sampling parameters sent with every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Maximum output tokens.
    pub max_tokens: u32,

    /// Temperature (0.0 - 1.0).
    pub temperature: f32,
}

/// A hosted text-generation model.
///
/// Implementations hold only immutable configuration and a pooled client,
/// so one instance is shared by all requests.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Send `prompt` as a single user turn and return the reply text.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Provider label used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;
}
