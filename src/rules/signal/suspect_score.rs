use crate::domain::{Decision, Evidence, RuleResult, SignalRecord};
use crate::rules::error::RuleError;
use crate::rules::traits::{EvalContext, SignalRule};

/// Suspect score rule.
///
/// Triggers when the vendor's aggregated suspect score is strictly above
/// the configured threshold.
#[derive(Debug)]
pub struct SuspectScoreRule {
    id: String,
    field: String,
    action: Decision,
    threshold: f64,
}

impl SuspectScoreRule {
    pub fn new(id: String, field: String, action: Decision, threshold: f64) -> Self {
        SuspectScoreRule {
            id,
            field,
            action,
            threshold,
        }
    }
}

impl SignalRule for SuspectScoreRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, signals: &SignalRecord, _ctx: &EvalContext) -> Result<RuleResult, RuleError> {
        let score = signals
            .f64_at(&self.field)
            .map_err(|e| RuleError::signal(&self.id, e))?;

        if score > self.threshold {
            return Ok(RuleResult::trigger(
                self.action.clone(),
                Evidence::observed(&self.id, &self.field, score.to_string())
                    .beyond(self.threshold.to_string()),
            ));
        }

        Ok(RuleResult::allow())
    }
}
