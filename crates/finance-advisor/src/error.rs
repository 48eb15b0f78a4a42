//! Error Types for the Finance Advisor

use llm_core::LlmError;
use thiserror::Error;

use crate::prompt::Placeholder;
use crate::state::{ActionKind, Phase};

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Gateway credentials or settings are unusable; never retried
    #[error("Configuration error: {0}")]
    Configuration(#[source] LlmError),

    /// Transient or provider-side failure during generation
    #[error("Gateway error: {0}")]
    Gateway(#[source] LlmError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<LlmError> for AdvisorError {
    fn from(err: LlmError) -> Self {
        if err.is_fatal() {
            Self::Configuration(err)
        } else {
            Self::Gateway(err)
        }
    }
}

impl From<serde_json::Error> for AdvisorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl AdvisorError {
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Gateway(e) => e.is_retryable(),
            _ => false,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration(e) | Self::Gateway(e) => e.user_message(),
            Self::Validation(e) => e.to_string(),
            Self::Serialization(_) => "Your profile could not be prepared for analysis.".into(),
        }
    }
}

/// Rejected inputs or actions; nothing was sent to the gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Missing value for placeholder {{{0}}}")]
    MissingPlaceholder(Placeholder),

    #[error("Template references unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),

    #[error("Malformed template: {0}")]
    MalformedTemplate(String),

    #[error("Action '{action}' is not available while the session is {phase}")]
    ActionUnavailable { action: ActionKind, phase: Phase },

    #[error("Unknown advice category: {0}")]
    UnknownAdviceCategory(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_gateway_errors_become_configuration() {
        let err: AdvisorError = LlmError::Auth("401".into()).into();
        assert!(matches!(err, AdvisorError::Configuration(_)));

        let err: AdvisorError = LlmError::ProviderUnavailable("503".into()).into();
        assert!(matches!(err, AdvisorError::Gateway(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_validation_messages() {
        let err = ValidationError::MissingPlaceholder(Placeholder::Analysis);
        assert_eq!(err.to_string(), "Missing value for placeholder {analysis}");

        let err = ValidationError::ActionUnavailable {
            action: ActionKind::RequestFeedback,
            phase: Phase::Empty,
        };
        assert_eq!(
            err.to_string(),
            "Action 'request_feedback' is not available while the session is empty"
        );
    }
}
