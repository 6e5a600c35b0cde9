use thiserror::Error;

use crate::domain::SchemaError;
use crate::rules::RuleError;
use crate::sealed::{CryptoError, DecompressError, FramingError};

/// Any failure on the path from sealed result to decision.
///
/// Every variant denies the request with the same response; the variant
/// only feeds logs and metrics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Decompress error: {0}")]
    Decompress(#[from] DecompressError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Rule evaluation error: {0}")]
    RuleEvaluation(#[from] RuleError),
}

impl GateError {
    /// Stable label for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            GateError::Framing(_) => "framing",
            GateError::Crypto(_) => "crypto",
            GateError::Decompress(_) => "decompress",
            GateError::Schema(_) => "schema",
            GateError::RuleEvaluation(_) => "rule_evaluation",
        }
    }

    /// True for failures that point at a forged or altered sealed result
    /// rather than a payload we could not interpret.
    pub fn is_tampering(&self) -> bool {
        matches!(
            self,
            GateError::Framing(FramingError::BadMagic { .. })
                | GateError::Crypto(CryptoError::AuthenticationFailed)
        )
    }
}
