use thiserror::Error as ThisError;

use super::attempt::AttemptOutcome;

/// Closed classification of a failed provider call.
///
/// Built once at the adapter boundary; the rotation loop only matches on the variant.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum CallError {
    /// Rate limit, exhausted quota or an overloaded service. Triggers rotation.
    #[error("quota exhausted (upstream status {status:?}): {message}")]
    Quota {
        status: Option<u16>,
        message: String,
    },

    /// The provider refused the request itself. Never retried.
    #[error("request rejected (upstream status {status:?}): {message}")]
    Validation {
        status: Option<u16>,
        message: String,
    },

    /// Timeout, connection failure or an upstream 5xx other than 503.
    #[error("transient upstream failure: {0}")]
    Transient(String),
}

impl CallError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            status: None,
            message: message.into(),
        }
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, Self::Quota { .. })
    }

    pub fn outcome(&self) -> AttemptOutcome {
        match self {
            Self::Quota { .. } => AttemptOutcome::QuotaExceeded,
            Self::Validation { .. } => AttemptOutcome::ValidationError,
            Self::Transient(_) => AttemptOutcome::TransientError,
        }
    }
}
