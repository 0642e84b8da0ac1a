//! Provider error types for tutorflow-llm.
//!
//! All provider operations return [`Result<T>`] which uses [`ProviderError`]
//! as the error type.

use thiserror::Error;

/// Errors that can occur when calling an LLM provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// Authentication with the provider was rejected (HTTP 401/403).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The provider returned a rate-limit response (HTTP 429).
    #[error("rate limited: retry after {retry_after_ms}ms")]
    RateLimited {
        /// Suggested wait time before retrying, in milliseconds.
        retry_after_ms: u64,
    },

    /// The requested model does not exist on the provider.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// No API key is available.
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// The provider returned a response that could not be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request exceeded the configured HTTP timeout.
    #[error("timeout")]
    Timeout,

    /// A transport-level error from reqwest.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A convenience type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_request_failed() {
        let err = ProviderError::RequestFailed("HTTP 500: overloaded".into());
        assert_eq!(err.to_string(), "request failed: HTTP 500: overloaded");
    }

    #[test]
    fn display_auth_failed() {
        let err = ProviderError::AuthFailed("Invalid API-key provided.".into());
        assert_eq!(
            err.to_string(),
            "authentication failed: Invalid API-key provided."
        );
    }

    #[test]
    fn display_rate_limited() {
        let err = ProviderError::RateLimited {
            retry_after_ms: 2000,
        };
        assert_eq!(err.to_string(), "rate limited: retry after 2000ms");
    }

    #[test]
    fn display_not_configured() {
        let err = ProviderError::NotConfigured("set DASHSCOPE_API_KEY env var".into());
        assert_eq!(
            err.to_string(),
            "provider not configured: set DASHSCOPE_API_KEY env var"
        );
    }

    #[test]
    fn display_timeout() {
        assert_eq!(ProviderError::Timeout.to_string(), "timeout");
    }

    #[test]
    fn display_invalid_response() {
        let err = ProviderError::InvalidResponse("failed to parse response: EOF".into());
        assert_eq!(err.to_string(), "invalid response: failed to parse response: EOF");
    }
}
