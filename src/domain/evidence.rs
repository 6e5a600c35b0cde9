use std::fmt;

use serde::{Deserialize, Serialize};

use super::Decision;

/// What a rule saw when it denied a request.
///
/// Goes to the decision log, never to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub rule_id: String,

    /// Dotted signal path that was read
    pub path: String,

    /// Observed value, rendered for logging
    pub value: String,

    /// Configured bound the value crossed, for threshold rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

impl Evidence {
    pub fn observed(rule_id: impl Into<String>, path: impl Into<String>, value: impl Into<String>) -> Self {
        Evidence {
            rule_id: rule_id.into(),
            path: path.into(),
            value: value.into(),
            limit: None,
        }
    }

    /// Attach the bound that was crossed.
    pub fn beyond(mut self, limit: impl Into<String>) -> Self {
        self.limit = Some(limit.into());
        self
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}={}", self.rule_id, self.path, self.value)?;
        if let Some(limit) = &self.limit {
            write!(f, " (limit {})", limit)?;
        }
        Ok(())
    }
}

/// Outcome of a single rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleResult {
    /// Whether the rule triggered
    pub hit: bool,

    pub decision: Decision,

    pub evidence: Option<Evidence>,
}

impl RuleResult {
    /// Rule did not trigger.
    #[inline]
    pub fn allow() -> Self {
        RuleResult {
            hit: false,
            decision: Decision::Allow,
            evidence: None,
        }
    }

    pub fn trigger(decision: Decision, evidence: Evidence) -> Self {
        RuleResult {
            hit: true,
            decision,
            evidence: Some(evidence),
        }
    }
}

impl Default for RuleResult {
    fn default() -> Self {
        RuleResult::allow()
    }
}
