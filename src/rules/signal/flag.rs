use crate::domain::{Decision, Evidence, RuleResult, SignalRecord};
use crate::rules::error::RuleError;
use crate::rules::traits::{EvalContext, SignalRule};

/// Boolean flag rule.
///
/// Triggers when the flag at `field` is `true`. Backs both the IP blocklist
/// and the tampering rule types.
#[derive(Debug)]
pub struct FlagRule {
    id: String,
    field: String,
    action: Decision,
}

impl FlagRule {
    pub fn new(id: String, field: String, action: Decision) -> Self {
        FlagRule { id, field, action }
    }
}

impl SignalRule for FlagRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, signals: &SignalRecord, _ctx: &EvalContext) -> Result<RuleResult, RuleError> {
        let flagged = signals
            .bool_at(&self.field)
            .map_err(|e| RuleError::signal(&self.id, e))?;

        if flagged {
            return Ok(RuleResult::trigger(
                self.action.clone(),
                Evidence::observed(&self.id, &self.field, "true"),
            ));
        }

        Ok(RuleResult::allow())
    }
}
