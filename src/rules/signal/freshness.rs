use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::domain::{Decision, Evidence, RuleResult, SignalRecord};
use crate::rules::error::RuleError;
use crate::rules::traits::{EvalContext, SignalRule};

/// Identification timestamp freshness rule.
///
/// Triggers when the identification event is older than the configured
/// window. The timestamp may be epoch milliseconds or an RFC 3339 string.
/// Timestamps in the future are treated as fresh.
#[derive(Debug)]
pub struct TimestampFreshnessRule {
    id: String,
    field: String,
    action: Decision,
    window_ms: u64,
}

impl TimestampFreshnessRule {
    pub fn new(id: String, field: String, action: Decision, window_ms: u64) -> Self {
        TimestampFreshnessRule {
            id,
            field,
            action,
            window_ms,
        }
    }

    fn parse_timestamp(&self, value: &Value) -> Result<DateTime<Utc>, RuleError> {
        let parsed = match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        };

        parsed.ok_or_else(|| RuleError::InvalidTimestamp {
            rule_id: self.id.clone(),
            path: self.field.clone(),
            value: value.to_string(),
        })
    }
}

impl SignalRule for TimestampFreshnessRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, signals: &SignalRecord, ctx: &EvalContext) -> Result<RuleResult, RuleError> {
        let value = signals
            .value_at(&self.field)
            .map_err(|e| RuleError::signal(&self.id, e))?;
        let timestamp = self.parse_timestamp(value)?;

        let age_ms = (ctx.now - timestamp).num_milliseconds();
        let window_ms = i64::try_from(self.window_ms).unwrap_or(i64::MAX);
        if age_ms > window_ms {
            return Ok(RuleResult::trigger(
                self.action.clone(),
                Evidence::observed(&self.id, &self.field, age_ms.to_string())
                    .beyond(self.window_ms.to_string()),
            ));
        }

        Ok(RuleResult::allow())
    }
}
