use crate::domain::{Decision, Evidence, RuleResult, SignalRecord};
use crate::rules::error::RuleError;
use crate::rules::traits::{EvalContext, SignalRule};

/// Bot detection result meaning "human".
pub const NOT_DETECTED: &str = "notDetected";

/// Bot detection rule.
///
/// Anything other than `notDetected` (good bots included) triggers.
#[derive(Debug)]
pub struct BotRule {
    id: String,
    field: String,
    action: Decision,
}

impl BotRule {
    pub fn new(id: String, field: String, action: Decision) -> Self {
        BotRule { id, field, action }
    }
}

impl SignalRule for BotRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, signals: &SignalRecord, _ctx: &EvalContext) -> Result<RuleResult, RuleError> {
        let result = signals
            .str_at(&self.field)
            .map_err(|e| RuleError::signal(&self.id, e))?;

        if result != NOT_DETECTED {
            return Ok(RuleResult::trigger(
                self.action.clone(),
                Evidence::observed(&self.id, &self.field, result),
            ));
        }

        Ok(RuleResult::allow())
    }
}
