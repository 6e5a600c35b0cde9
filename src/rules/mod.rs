pub mod error;
pub mod signal;
pub mod traits;

pub use error::RuleError;
pub use signal::{BotRule, FlagRule, SuspectScoreRule, TimestampFreshnessRule};
pub use traits::{EvalContext, SignalRule};

use crate::domain::{Decision, Policy, RuleResult, RuleType, SignalRecord};
use std::sync::Arc;
use tracing::warn;

/// Ordered collection of compiled rules.
///
/// Evaluation is first-match-wins in declared order. No match allows.
#[derive(Debug)]
pub struct RuleSet {
    pub rules: Vec<Arc<dyn SignalRule>>,
    pub policy_version: String,
}

impl RuleSet {
    /// Build rules from a policy, keeping its order.
    pub fn from_policy(policy: &Policy) -> Self {
        let mut rules: Vec<Arc<dyn SignalRule>> = Vec::with_capacity(policy.rules.len());

        for rule_def in &policy.rules {
            let id = rule_def.id.clone();
            let field = rule_def.field_path().to_string();
            let action = Decision::deny(rule_def.status, rule_def.message.clone());

            match rule_def.rule_type {
                RuleType::TimestampFreshness => {
                    rules.push(Arc::new(TimestampFreshnessRule::new(
                        id,
                        field,
                        action,
                        policy.params.freshness_window_ms,
                    )));
                }
                RuleType::BotDetected => {
                    rules.push(Arc::new(BotRule::new(id, field, action)));
                }
                RuleType::SuspectScore => {
                    rules.push(Arc::new(SuspectScoreRule::new(
                        id,
                        field,
                        action,
                        policy.params.suspect_score_threshold,
                    )));
                }
                RuleType::IpBlocklist | RuleType::Tampering => {
                    rules.push(Arc::new(FlagRule::new(id, field, action)));
                }
            }
        }

        RuleSet {
            rules,
            policy_version: policy.version.clone(),
        }
    }

    /// Create an empty rule set.
    pub fn empty() -> Self {
        RuleSet {
            rules: Vec::new(),
            policy_version: "0.0.0".to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run the rules in order and return the first hit, or allow.
    ///
    /// Stops at the first rule that cannot evaluate; later rules are not
    /// consulted.
    pub fn try_evaluate(
        &self,
        signals: &SignalRecord,
        ctx: &EvalContext,
    ) -> Result<RuleResult, RuleError> {
        for rule in &self.rules {
            let result = rule.evaluate(signals, ctx)?;
            if result.hit {
                return Ok(result);
            }
        }

        Ok(RuleResult::allow())
    }

    /// Run the rules, turning an evaluation error into the fail-closed
    /// denial. The error is handed back for telemetry.
    pub fn decide(&self, signals: &SignalRecord, ctx: &EvalContext) -> (RuleResult, Option<RuleError>) {
        match self.try_evaluate(signals, ctx) {
            Ok(result) => (result, None),
            Err(e) => {
                warn!(rule_id = e.rule_id(), error = %e, "Rule evaluation failed, denying");
                let denial = RuleResult {
                    hit: true,
                    decision: Decision::malformed(),
                    evidence: None,
                };
                (denial, Some(e))
            }
        }
    }

    /// Run the rules and return only the decision.
    pub fn evaluate(&self, signals: &SignalRecord, ctx: &EvalContext) -> Decision {
        self.decide(signals, ctx).0.decision
    }
}
