//! Error Types

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, LlmError>;

/// Gateway and session error types
#[derive(Error, Debug)]
pub enum LlmError {
    /// Provider rejected or failed the request
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Generation did not finish within the configured bound
    #[error("Provider timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Configuration error (missing credentials, bad values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider response could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Session storage error
    #[error("Session error: {0}")]
    Session(String),

    /// No session with this ID
    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

impl LlmError {
    /// Check if a caller-side retry could succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::Timeout(_) | Self::RateLimited(_)
        )
    }

    /// Fatal errors mean the gateway is misconfigured; retrying is pointless.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Config(_))
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::Timeout(_) => "The AI service took too long to respond. Please try again.".into(),
            Self::RateLimited(_) => "You've made too many requests. Please wait a moment.".into(),
            Self::Auth(_) => "The AI service rejected our credentials.".into(),
            Self::Config(_) => "The AI service is not configured correctly.".into(),
            Self::SessionNotFound(_) => "This session has expired or does not exist.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
