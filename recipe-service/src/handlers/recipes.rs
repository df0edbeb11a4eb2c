use crate::error::RecipeError;
use crate::models::{Recipe, RecipeRequest, RecipeResponse};
use crate::services::metrics;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::extract::ApiJson;

/// `POST /api/v1/generate-recipe`
///
/// A blank prompt is rejected before the model is called. Preferences and
/// locale are passed through as given.
pub async fn generate_recipe(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RecipeRequest>,
) -> Result<Json<RecipeResponse>, RecipeError> {
    let result = generate(&state, &request).await;

    match &result {
        Ok(_) => metrics::record_generation("success"),
        Err(e) => metrics::record_generation(e.outcome()),
    }

    result.map(|recipe| Json(RecipeResponse::single(recipe)))
}

async fn generate(
    state: &AppState,
    request: &RecipeRequest,
) -> Result<Recipe, RecipeError> {
    let prompt = request.trimmed_prompt().ok_or(RecipeError::InvalidPrompt)?;

    let recipe = state
        .generator
        .generate_recipe(prompt, request.dietary_preferences(), request.locale())
        .await?;

    tracing::info!(
        title = %recipe.title,
        ingredients = recipe.ingredients.len(),
        "Recipe generated"
    );

    Ok(recipe)
}
