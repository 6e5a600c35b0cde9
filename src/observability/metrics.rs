use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::domain::Decision;
use crate::gate::GateError;

/// Metrics registry for the gate.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Total requests that reached the gate
    pub requests_total: AtomicU64,

    /// Decisions by outcome
    pub decisions_allow: AtomicU64,
    pub decisions_deny_rule: AtomicU64,
    pub decisions_deny_failure: AtomicU64,

    /// Requests rejected before unsealing (wrong method, bad body)
    pub malformed_requests: AtomicU64,

    /// Pipeline failures by kind
    pub failures_framing: AtomicU64,
    pub failures_crypto: AtomicU64,
    pub failures_decompress: AtomicU64,
    pub failures_schema: AtomicU64,
    pub failures_rule_evaluation: AtomicU64,

    /// Origin forwarding
    pub upstream_errors: AtomicU64,

    /// Decision latency buckets (microseconds)
    pub latency_under_1ms: AtomicU64,
    pub latency_1_5ms: AtomicU64,
    pub latency_5_10ms: AtomicU64,
    pub latency_10_50ms: AtomicU64,
    pub latency_over_50ms: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        MetricsRegistry::default()
    }

    /// Record a gate outcome. `failure` is set when the request failed closed.
    pub fn record_decision(&self, decision: &Decision, failure: Option<&GateError>) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        match (decision, failure) {
            (Decision::Allow, _) => {
                self.decisions_allow.fetch_add(1, Ordering::Relaxed);
            }
            (Decision::Deny { .. }, None) => {
                self.decisions_deny_rule.fetch_add(1, Ordering::Relaxed);
            }
            (Decision::Deny { .. }, Some(error)) => {
                self.decisions_deny_failure.fetch_add(1, Ordering::Relaxed);
                self.record_failure(error);
            }
        }
    }

    fn record_failure(&self, error: &GateError) {
        let counter = match error {
            GateError::Framing(_) => &self.failures_framing,
            GateError::Crypto(_) => &self.failures_crypto,
            GateError::Decompress(_) => &self.failures_decompress,
            GateError::Schema(_) => &self.failures_schema,
            GateError::RuleEvaluation(_) => &self.failures_rule_evaluation,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request rejected before it reached the pipeline.
    pub fn record_malformed_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.malformed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed origin call.
    pub fn record_upstream_error(&self) {
        self.upstream_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record decision latency.
    pub fn record_latency(&self, start: Instant) {
        let micros = start.elapsed().as_micros() as u64;

        if micros < 1000 {
            self.latency_under_1ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 5000 {
            self.latency_1_5ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 10000 {
            self.latency_5_10ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 50000 {
            self.latency_10_50ms.fetch_add(1, Ordering::Relaxed);
        } else {
            self.latency_over_50ms.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        format!(
            r#"# HELP sealgate_requests_total Total number of gated requests
# TYPE sealgate_requests_total counter
sealgate_requests_total {}

# HELP sealgate_decisions Gate decisions by outcome
# TYPE sealgate_decisions counter
sealgate_decisions{{outcome="allow"}} {}
sealgate_decisions{{outcome="deny_rule"}} {}
sealgate_decisions{{outcome="deny_failure"}} {}

# HELP sealgate_malformed_requests_total Requests rejected before unsealing
# TYPE sealgate_malformed_requests_total counter
sealgate_malformed_requests_total {}

# HELP sealgate_failures Pipeline failures by kind
# TYPE sealgate_failures counter
sealgate_failures{{kind="framing"}} {}
sealgate_failures{{kind="crypto"}} {}
sealgate_failures{{kind="decompress"}} {}
sealgate_failures{{kind="schema"}} {}
sealgate_failures{{kind="rule_evaluation"}} {}

# HELP sealgate_upstream_errors_total Failed origin requests
# TYPE sealgate_upstream_errors_total counter
sealgate_upstream_errors_total {}

# HELP sealgate_decision_latency_bucket Decision latency histogram
# TYPE sealgate_decision_latency_bucket counter
sealgate_decision_latency_bucket{{le="0.001"}} {}
sealgate_decision_latency_bucket{{le="0.005"}} {}
sealgate_decision_latency_bucket{{le="0.01"}} {}
sealgate_decision_latency_bucket{{le="0.05"}} {}
sealgate_decision_latency_bucket{{le="+Inf"}} {}
"#,
            self.requests_total.load(Ordering::Relaxed),
            self.decisions_allow.load(Ordering::Relaxed),
            self.decisions_deny_rule.load(Ordering::Relaxed),
            self.decisions_deny_failure.load(Ordering::Relaxed),
            self.malformed_requests.load(Ordering::Relaxed),
            self.failures_framing.load(Ordering::Relaxed),
            self.failures_crypto.load(Ordering::Relaxed),
            self.failures_decompress.load(Ordering::Relaxed),
            self.failures_schema.load(Ordering::Relaxed),
            self.failures_rule_evaluation.load(Ordering::Relaxed),
            self.upstream_errors.load(Ordering::Relaxed),
            self.latency_under_1ms.load(Ordering::Relaxed),
            self.latency_1_5ms.load(Ordering::Relaxed),
            self.latency_5_10ms.load(Ordering::Relaxed),
            self.latency_10_50ms.load(Ordering::Relaxed),
            self.latency_over_50ms.load(Ordering::Relaxed),
        )
    }
}
