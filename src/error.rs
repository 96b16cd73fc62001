//! Error types for Jium.

use std::collections::BTreeMap;
use std::time::Duration;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Invalid template definition {template}: {reason}")]
    InvalidTemplate { template: String, reason: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} returned an empty completion")]
    EmptyResponse { provider: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },
}

/// Errors raised by an admission counter store.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("Counter store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Terminal failures of one synthesis attempt.
///
/// Each variant maps to exactly one external error code. `Display` carries the
/// generic, user-facing message and never the internal cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    /// Malformed body (`fields` empty) or failed field validation.
    #[error("{message}")]
    InvalidInput {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    #[error("지원하지 않는 템플릿 종류입니다.")]
    InvalidTemplateType { template_type: String },

    #[error("요청이 너무 많습니다. 잠시 후 다시 시도해주세요.")]
    TooManyRequests,

    #[error("프롬프트 생성에 실패했습니다.")]
    GenerationFailed,
}

impl SynthesisError {
    /// Malformed request, rejected before any schema dispatch.
    pub fn malformed() -> Self {
        Self::InvalidInput {
            message: "필수 입력값이 누락되었습니다.".to_string(),
            fields: BTreeMap::new(),
        }
    }

    /// Field-level validation failure.
    pub fn invalid_fields(fields: BTreeMap<String, Vec<String>>) -> Self {
        Self::InvalidInput {
            message: "입력값을 확인해주세요.".to_string(),
            fields,
        }
    }

    /// Wire error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::InvalidTemplateType { .. } => "INVALID_TEMPLATE_TYPE",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::GenerationFailed => "GENERATION_FAILED",
        }
    }

    /// Human-readable detail safe to show to the end user, including every
    /// field message for validation failures.
    pub fn public_detail(&self) -> String {
        match self {
            Self::InvalidInput { message, fields } if !fields.is_empty() => {
                let details: Vec<&str> = fields
                    .values()
                    .flat_map(|msgs| msgs.iter().map(String::as_str))
                    .collect();
                format!("{} {}", message, details.join(" "))
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
