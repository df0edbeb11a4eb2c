use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-haiku-20240307-v1:0";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone)]
pub struct RecipeConfig {
    pub common: core_config::Config,
    pub provider: ProviderKind,
    pub bedrock: BedrockSettings,
    pub generation: GenerationSettings,
}

/// Which model backend serves generation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Bedrock,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bedrock" => Ok(ProviderKind::Bedrock),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "Unknown RECIPE_PROVIDER '{}', expected 'bedrock' or 'mock'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BedrockSettings {
    pub region: String,
    pub model_id: String,
    /// Overrides `https://bedrock-runtime.{region}.amazonaws.com`.
    pub endpoint: Option<String>,
    /// Bedrock API key, sent as a bearer token. When unset, requests are
    /// signed with the AWS default credential chain (e.g. the ECS task role).
    pub api_key: Option<Secret<String>>,
    pub timeout: Duration,
}

/// Sampling settings applied to every generation; never taken from callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl RecipeConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let provider: ProviderKind = get_env("RECIPE_PROVIDER", Some("bedrock"), is_prod)?.parse()?;

        Ok(RecipeConfig {
            common: common_config,
            provider,
            bedrock: BedrockSettings {
                region: get_env("AWS_REGION", Some(DEFAULT_REGION), is_prod)?,
                model_id: get_env("BEDROCK_MODEL_ID", Some(DEFAULT_MODEL_ID), is_prod)?,
                endpoint: env::var("BEDROCK_ENDPOINT")
                    .ok()
                    .filter(|endpoint| !endpoint.trim().is_empty()),
                api_key: optional_secret(env::var("AWS_BEARER_TOKEN_BEDROCK").ok()),
                timeout: Duration::from_secs(parse_env(
                    "BEDROCK_TIMEOUT_SECS",
                    DEFAULT_TIMEOUT_SECS,
                )?),
            },
            generation: GenerationSettings {
                max_tokens: parse_env("RECIPE_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
                temperature: parse_env("RECIPE_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// A blank value counts as unset.
fn optional_secret(value: Option<String>) -> Option<Secret<String>> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(Secret::new)
}

/// Numeric tunables fall back to their default when unset, but a value that
/// is set and unparsable stops start-up.
fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!("Bedrock".parse::<ProviderKind>().unwrap(), ProviderKind::Bedrock);
        assert_eq!(" mock ".parse::<ProviderKind>().unwrap(), ProviderKind::Mock);
        assert!("openai".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn numeric_values_are_parsed() {
        let tokens: u32 = parse_value("RECIPE_MAX_TOKENS", " 2048 ").unwrap();
        let temperature: f32 = parse_value("RECIPE_TEMPERATURE", "0.7").unwrap();

        assert_eq!(tokens, 2048);
        assert!((temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn garbage_numeric_value_is_a_config_error() {
        let result: Result<u32, _> = parse_value("RECIPE_MAX_TOKENS", "lots");

        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn blank_api_key_falls_back_to_the_credential_chain() {
        use secrecy::ExposeSecret;

        assert!(optional_secret(None).is_none());
        assert!(optional_secret(Some("  ".to_string())).is_none());

        let key = optional_secret(Some("br-key".to_string())).unwrap();
        assert_eq!(key.expose_secret(), "br-key");
    }

    #[test]
    fn generation_defaults_favour_determinism() {
        let settings = GenerationSettings::default();

        assert_eq!(settings.max_tokens, 1000);
        assert!((settings.temperature - 0.3).abs() < f32::EPSILON);
    }
}
