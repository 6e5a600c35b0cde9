use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::error::RuleError;
use crate::domain::{RuleResult, SignalRecord};

/// Per-evaluation context shared by every rule in a pass.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext {
    /// Wall clock used by time-based rules
    pub now: DateTime<Utc>,
}

impl EvalContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        EvalContext { now }
    }

    /// Context pinned to the current time.
    pub fn now() -> Self {
        EvalContext { now: Utc::now() }
    }
}

/// A single predicate over the decoded signals.
///
/// Rules are stateless and evaluated synchronously in the request path.
/// A rule reads only the fields it needs; a missing or malformed field is
/// an error, never a silent pass.
pub trait SignalRule: Send + Sync + Debug {
    /// Unique identifier for this rule.
    fn id(&self) -> &str;

    /// Evaluate the rule against the signals.
    fn evaluate(&self, signals: &SignalRecord, ctx: &EvalContext) -> Result<RuleResult, RuleError>;
}
