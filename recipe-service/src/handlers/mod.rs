//! HTTP handlers for recipe-service.

pub mod health;
pub mod recipes;

pub use health::{health_check, metrics};
pub use recipes::generate_recipe;
