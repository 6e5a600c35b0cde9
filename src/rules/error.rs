use thiserror::Error;

use crate::domain::SchemaError;

/// Errors raised while a rule evaluates its predicate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Rule {rule_id} could not read its signal: {source}")]
    Signal {
        rule_id: String,
        #[source]
        source: SchemaError,
    },

    #[error("Rule {rule_id} found an unusable timestamp at {path}: {value}")]
    InvalidTimestamp {
        rule_id: String,
        path: String,
        value: String,
    },
}

impl RuleError {
    /// Wrap a field lookup failure for the given rule.
    pub fn signal(rule_id: &str, source: SchemaError) -> Self {
        RuleError::Signal {
            rule_id: rule_id.to_string(),
            source,
        }
    }

    /// The rule that failed.
    pub fn rule_id(&self) -> &str {
        match self {
            RuleError::Signal { rule_id, .. } | RuleError::InvalidTimestamp { rule_id, .. } => {
                rule_id
            }
        }
    }
}
