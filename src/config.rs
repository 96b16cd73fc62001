//! Service configuration, read from `JIUM_*` environment variables.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::admission::{AdmissionConfig, FallbackPolicy};
use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};
use crate::synthesis::SynthesizerConfig;

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP listen port.
    pub port: u16,
    pub llm: LlmConfig,
    pub synthesizer: SynthesizerConfig,
    pub admission: AdmissionConfig,
}

impl ServiceConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match get("JIUM_LLM_BACKEND") {
            Some(v) => v.parse::<LlmBackend>()?,
            None => LlmBackend::Anthropic,
        };
        let api_key_var = backend.api_key_var();
        let api_key = get(api_key_var)
            .ok_or_else(|| ConfigError::MissingEnvVar(api_key_var.to_string()))?;
        let model = get("JIUM_MODEL").unwrap_or_else(|| backend.default_model().to_string());

        let defaults = SynthesizerConfig::default();
        let synthesizer = SynthesizerConfig {
            temperature: parse_or(&get, "JIUM_TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_or(&get, "JIUM_MAX_TOKENS", defaults.max_tokens)?,
            timeout: Duration::from_secs(parse_or(
                &get,
                "JIUM_GENERATION_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
        };
        if !(0.0..=2.0).contains(&synthesizer.temperature) {
            return Err(invalid("JIUM_TEMPERATURE", "must be between 0.0 and 2.0"));
        }
        if synthesizer.timeout.is_zero() {
            return Err(invalid("JIUM_GENERATION_TIMEOUT_SECS", "must be positive"));
        }

        let limits = AdmissionConfig::default();
        let admission = AdmissionConfig {
            max_requests: parse_or(&get, "JIUM_RATE_LIMIT", limits.max_requests)?,
            window: Duration::from_secs(parse_or(
                &get,
                "JIUM_RATE_WINDOW_SECS",
                limits.window.as_secs(),
            )?),
            fallback: match get("JIUM_UNKNOWN_CALLER") {
                Some(v) => v.parse::<FallbackPolicy>()?,
                None => limits.fallback,
            },
            trust_forwarded: parse_or(&get, "JIUM_TRUST_FORWARDED", limits.trust_forwarded)?,
        };
        if admission.window.is_zero() {
            return Err(invalid("JIUM_RATE_WINDOW_SECS", "must be positive"));
        }

        Ok(Self {
            port: parse_or(&get, "JIUM_PORT", 8080)?,
            llm: LlmConfig {
                backend,
                api_key: SecretString::from(api_key),
                model,
            },
            synthesizer,
            admission,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, &format!("'{raw}': {e}"))),
        None => Ok(default),
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
