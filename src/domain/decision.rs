use serde::{Deserialize, Serialize};
use std::fmt;

/// Status used for every denial unless a rule says otherwise.
pub const DEFAULT_DENY_STATUS: u16 = 403;

/// Body of the uniform fail-closed response.
pub const MALFORMED_MESSAGE: &str = "Malformed unexpected request";

/// Gate outcome for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Forward the request to origin
    #[default]
    Allow,
    /// Reject with the given HTTP status and message
    Deny { status: u16, message: String },
}

impl Decision {
    /// Create a denial.
    pub fn deny(status: u16, message: impl Into<String>) -> Self {
        Decision::Deny {
            status,
            message: message.into(),
        }
    }

    /// The fail-closed denial used for every malformed or unverifiable request.
    pub fn malformed() -> Self {
        Decision::deny(DEFAULT_DENY_STATUS, MALFORMED_MESSAGE)
    }

    /// Returns true if the request may go to origin.
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// HTTP status of a denial, `None` for allow.
    pub fn status(&self) -> Option<u16> {
        match self {
            Decision::Allow => None,
            Decision::Deny { status, .. } => Some(*status),
        }
    }

    /// Message of a denial, `None` for allow.
    pub fn message(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::Deny { message, .. } => Some(message),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => write!(f, "ALLOW"),
            Decision::Deny { status, .. } => write!(f, "DENY({})", status),
        }
    }
}
