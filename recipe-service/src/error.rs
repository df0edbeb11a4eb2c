use crate::services::{GenerationError, OutputContractError};
use axum::response::{IntoResponse, Response};
use service_core::error::AppError;
use thiserror::Error;

pub const INVALID_PROMPT: &str = "INVALID_PROMPT";
pub const GENERATION_FAILED: &str = "GENERATION_FAILED";

pub const INVALID_PROMPT_MESSAGE: &str = "Prompt is required and cannot be blank.";
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate recipe.";

/// Everything that can end a generate-recipe request early.
#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("Prompt is missing or blank")]
    InvalidPrompt,

    #[error("Recipe generation failed: {0}")]
    Generation(#[from] GenerationError),
}

impl RecipeError {
    /// Outcome label for the generation counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            RecipeError::InvalidPrompt => "invalid_prompt",
            RecipeError::Generation(e) => e.outcome(),
        }
    }
}

impl From<RecipeError> for AppError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::InvalidPrompt => {
                tracing::info!("Rejected request with blank prompt");
                AppError::bad_request(INVALID_PROMPT, INVALID_PROMPT_MESSAGE)
            }
            RecipeError::Generation(GenerationError::Provider(e)) => {
                tracing::error!(
                    error_type = e.kind(),
                    error = %e,
                    "Model provider call failed"
                );
                AppError::internal(GENERATION_FAILED, GENERATION_FAILED_MESSAGE, e.into())
            }
            RecipeError::Generation(GenerationError::OutputContract(e)) => {
                // Raw and normalized text were already logged at parse time.
                let kind = match &e {
                    OutputContractError::InvalidJson { .. } => "invalid_json",
                    OutputContractError::SchemaMismatch { .. } => "schema_mismatch",
                };
                tracing::error!(error_type = kind, error = %e, "Model reply was unusable");
                AppError::internal(GENERATION_FAILED, GENERATION_FAILED_MESSAGE, e.into())
            }
        }
    }
}

impl IntoResponse for RecipeError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
