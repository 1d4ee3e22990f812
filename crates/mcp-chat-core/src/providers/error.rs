//! Provider error types

use thiserror::Error;

/// Errors from a model request. All of them abort the current query.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No API key in the model config
    #[error("API key is required for {provider}")]
    MissingApiKey { provider: String },

    /// Non-2xx response other than 429
    #[error("{provider} API error ({status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    /// 429 from the API
    #[error("{provider} rate limited: {message}")]
    RateLimited { provider: String, message: String },

    /// The request never got an HTTP response
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 2xx with a body that is not a Messages API response
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn rate_limited(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// HTTP status when the API answered with an error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
