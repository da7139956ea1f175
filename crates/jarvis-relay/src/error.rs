use std::time::Duration;
use thiserror::Error;

/// Reasons a chat turn could not produce a model reply.
///
/// Every variant degrades to the fallback reply at the HTTP layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    #[error("completion provider credentials are not configured")]
    MissingCredentials,

    #[error("completion request timed out after {0:?}")]
    GatewayTimeout(Duration),

    #[error("completion provider failed: {0}")]
    GatewayError(String),

    #[error("completion provider returned an empty reply")]
    EmptyReply,
}

impl ChatError {
    /// Short label used for metrics and structured logs
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::GatewayTimeout(_) => "timeout",
            Self::GatewayError(_) => "gateway_error",
            Self::EmptyReply => "empty_reply",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_labels_are_distinct() {
        let errors = [
            ChatError::MissingCredentials,
            ChatError::GatewayTimeout(Duration::from_secs(1)),
            ChatError::GatewayError("boom".into()),
            ChatError::EmptyReply,
        ];
        let mut labels: Vec<_> = errors.iter().map(|e| e.reason()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), errors.len());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = ChatError::GatewayError("500 Internal Server Error: overloaded".into());
        assert!(err.to_string().contains("overloaded"));
        let err = ChatError::GatewayTimeout(Duration::from_millis(1500));
        assert!(err.to_string().contains("1.5s"));
    }
}
