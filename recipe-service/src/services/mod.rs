pub mod generator;
pub mod metrics;
pub mod normalize;
pub mod prompt_builder;
pub mod providers;

pub use generator::{GenerationError, OutputContractError, RecipeGenerator};
pub use providers::{GenerationParams, ProviderError, TextProvider};
