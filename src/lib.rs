pub mod api;
pub mod config;
pub mod domain;
pub mod gate;
pub mod observability;
pub mod policy;
pub mod rules;
pub mod sealed;

pub use config::Config;
pub use domain::{Decision, Evidence, SignalRecord};
pub use gate::{Gate, GateError, Verdict};
pub use rules::{RuleSet, SignalRule};
