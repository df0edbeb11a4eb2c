//! Recipe shapes shared by the model reply and the HTTP response.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,

    /// Amount in `unit`; fractional values are allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A generated recipe. Ingredient order is the order the model returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub title: String,

    pub ingredients: Vec<Ingredient>,

    /// Free-text cooking directions.
    pub instructions: String,

    /// Whole minutes; the model sometimes writes `30.0`, which is accepted.
    #[serde(
        default,
        deserialize_with = "whole_minutes",
        skip_serializing_if = "Option::is_none"
    )]
    pub cook_time_minutes: Option<u32>,
}

fn whole_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Minutes {
        Int(u32),
        Float(f64),
    }

    match Option::<Minutes>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Minutes::Int(minutes)) => Ok(Some(minutes)),
        Some(Minutes::Float(minutes))
            if minutes.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&minutes) =>
        {
            Ok(Some(minutes as u32))
        }
        Some(Minutes::Float(minutes)) => Err(D::Error::custom(format!(
            "cookTimeMinutes must be a whole number of minutes, got {}",
            minutes
        ))),
    }
}

/// Success body of `POST /api/v1/generate-recipe`.
///
/// The list shape allows several recipes; generation currently yields one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub recipes: Vec<Recipe>,
}

impl RecipeResponse {
    pub fn single(recipe: Recipe) -> Self {
        Self {
            recipes: vec![recipe],
        }
    }
}
