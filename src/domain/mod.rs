pub mod decision;
pub mod evidence;
pub mod policy;
pub mod signals;

pub use decision::{Decision, DEFAULT_DENY_STATUS, MALFORMED_MESSAGE};
pub use evidence::{Evidence, RuleResult};
pub use policy::{Policy, RuleDef, RuleParams, RuleType, MAX_FRESHNESS_WINDOW_MS};
pub use signals::{SchemaError, SignalRecord};
