//! AWS Bedrock provider backed by the AWS SDK.
//!
//! Credentials come from the default provider chain (environment, shared
//! profile, ECS task role, instance metadata), so the service runs under an
//! IAM role with no key in its environment.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::operation::converse::{ConverseError, ConverseOutput};
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, InferenceConfiguration, Message, StopReason,
};
use aws_sdk_bedrockruntime::Client;
use std::time::Duration;

/// Settings for the SDK client.
#[derive(Debug, Clone)]
pub struct BedrockSdkConfig {
    pub region: String,
    pub model_id: String,
    /// Overrides the regional endpoint the SDK would resolve.
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

/// Bedrock Converse text provider using SigV4-signed SDK calls.
pub struct BedrockProvider {
    client: Client,
    model_id: String,
}

impl BedrockProvider {
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    /// Loads the shared AWS config (default credential chain) and builds a
    /// client from it. SDK retries are off: a failed call fails the request.
    pub async fn from_config(config: &BedrockSdkConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.timeout)
                    .build(),
            );

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config), config.model_id.clone())
    }
}

#[async_trait]
impl TextProvider for BedrockProvider {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(prompt.to_string()))
            .build()
            .map_err(|e| ProviderError::ApiError {
                code: "InvalidRequest".to_string(),
                message: e.to_string(),
            })?;

        let inference_config = InferenceConfiguration::builder()
            .max_tokens(i32::try_from(params.max_tokens).unwrap_or(i32::MAX))
            .temperature(params.temperature)
            .build();

        tracing::debug!(
            model = %self.model_id,
            prompt_len = prompt.len(),
            "Sending request to Bedrock via SDK"
        );

        let output = self
            .client
            .converse()
            .model_id(&self.model_id)
            .messages(message)
            .inference_config(inference_config)
            .send()
            .await
            .map_err(converse_error)?;

        reply_from(output)
    }

    fn name(&self) -> &'static str {
        "bedrock"
    }

    fn model(&self) -> &str {
        &self.model_id
    }
}

fn reply_from(output: ConverseOutput) -> Result<ProviderResponse, ProviderError> {
    let finish_reason = finish_reason(output.stop_reason());
    if finish_reason == FinishReason::ContentFilter {
        return Err(ProviderError::ContentFiltered);
    }

    let (input_tokens, output_tokens) = output
        .usage()
        .map(|u| (token_count(u.input_tokens()), token_count(u.output_tokens())))
        .unwrap_or((0, 0));

    // Take the first text block; other block kinds are skipped.
    let text = output
        .output()
        .and_then(|o| o.as_message().ok())
        .and_then(|m| m.content().iter().find_map(|block| block.as_text().ok()))
        .filter(|text| !text.trim().is_empty())
        .cloned()
        .ok_or(ProviderError::EmptyResponse)?;

    Ok(ProviderResponse {
        text,
        input_tokens,
        output_tokens,
        finish_reason,
    })
}

fn token_count(count: i32) -> u32 {
    u32::try_from(count).unwrap_or(0)
}

fn finish_reason(stop_reason: &StopReason) -> FinishReason {
    match stop_reason {
        StopReason::MaxTokens => FinishReason::Length,
        StopReason::ContentFiltered | StopReason::GuardrailIntervened => {
            FinishReason::ContentFilter
        }
        _ => FinishReason::Complete,
    }
}

/// Service errors keep the AWS error code and message; anything that never
/// got a service answer (credentials, DNS, timeout) is a network error.
fn converse_error<R>(err: SdkError<ConverseError, R>) -> ProviderError
where
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(context) => {
            let err = context.into_err();
            let message = err.message().unwrap_or("no error message").to_string();

            if err.is_throttling_exception() {
                return ProviderError::RateLimited(message);
            }

            ProviderError::ApiError {
                code: err.code().unwrap_or("Unknown").to_string(),
                message,
            }
        }
        timeout @ SdkError::TimeoutError(_) => ProviderError::NetworkError(format!(
            "Request timed out: {}",
            DisplayErrorContext(&timeout)
        )),
        other => ProviderError::NetworkError(DisplayErrorContext(&other).to_string()),
    }
}
