//! Domain models for the recipe service.

pub mod recipe;
pub mod request;

pub use recipe::{Ingredient, Recipe, RecipeResponse};
pub use request::RecipeRequest;
