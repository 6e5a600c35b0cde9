//! Sealed result pipeline: parse, decrypt, inflate, decode, evaluate.
//!
//! Stages run strictly in sequence and the first failure is terminal. A
//! [`Gate`] holds only immutable state, so one instance is shared across all
//! in-flight requests.

pub mod error;

pub use error::GateError;

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::domain::{Decision, Evidence, SignalRecord};
use crate::rules::{EvalContext, RuleSet};
use crate::sealed::{
    deflate, inflate, seal, unseal, DecompressError, SealedFrame, SecretKey,
    DEFAULT_MAX_INFLATED_BYTES,
};

/// Outcome of checking one sealed result.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// What to do with the request
    pub decision: Decision,

    /// Evidence from the rule that denied, if any
    pub evidence: Option<Evidence>,

    /// Why the request failed closed, if it did
    pub failure: Option<GateError>,
}

impl Verdict {
    fn failed(error: GateError) -> Self {
        Verdict {
            decision: Decision::malformed(),
            evidence: None,
            failure: Some(error),
        }
    }
}

/// Unseals vendor signals and runs the rule set over them.
#[derive(Debug)]
pub struct Gate {
    key: SecretKey,
    ruleset: Arc<RuleSet>,
    max_inflated_bytes: usize,
}

impl Gate {
    pub fn new(key: SecretKey, ruleset: Arc<RuleSet>) -> Self {
        Gate {
            key,
            ruleset,
            max_inflated_bytes: DEFAULT_MAX_INFLATED_BYTES,
        }
    }

    /// Cap the size of the inflated payload.
    pub fn with_max_inflated_bytes(mut self, limit: usize) -> Self {
        self.max_inflated_bytes = limit;
        self
    }

    pub fn ruleset(&self) -> &RuleSet {
        &self.ruleset
    }

    /// Turn a base64 sealed result into a signal record.
    pub fn unseal_signals(&self, sealed_base64: &str) -> Result<SignalRecord, GateError> {
        let frame = SealedFrame::parse(sealed_base64)?;
        let compressed = unseal(&frame, &self.key)?;
        let text = inflate(&compressed, self.max_inflated_bytes)?;
        Ok(SignalRecord::from_json(&text)?)
    }

    /// Check a sealed result at the given time.
    pub fn check_at(&self, sealed_base64: &str, ctx: &EvalContext) -> Verdict {
        let signals = match self.unseal_signals(sealed_base64) {
            Ok(signals) => signals,
            Err(e) => return Verdict::failed(e),
        };

        let (result, failure) = self.ruleset.decide(&signals, ctx);
        Verdict {
            decision: result.decision,
            evidence: result.evidence,
            failure: failure.map(GateError::from),
        }
    }

    /// Check a sealed result now.
    pub fn check(&self, sealed_base64: &str) -> Verdict {
        self.check_at(sealed_base64, &EvalContext::now())
    }
}

/// Build a sealed result the way the vendor does: deflate, encrypt, frame,
/// base64. Used for fixtures and benchmarks.
pub fn seal_signals(payload: &str, key: &SecretKey, nonce: &[u8]) -> Result<String, GateError> {
    let compressed = deflate(payload).map_err(|e| DecompressError::Corrupt(e.to_string()))?;
    let frame = seal(&compressed, key, nonce)?;
    Ok(BASE64.encode(frame.to_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Policy;
    use crate::sealed::{CryptoError, FramingError};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    const NOW_MS: i64 = 1_700_000_000_000;
    const NONCE: [u8; 12] = [0xA5; 12];

    fn key() -> SecretKey {
        SecretKey::from_bytes([7u8; 32])
    }

    fn gate() -> Gate {
        Gate::new(key(), Arc::new(RuleSet::from_policy(&Policy::reference())))
    }

    fn ctx() -> EvalContext {
        EvalContext::new(Utc.timestamp_millis_opt(NOW_MS).unwrap())
    }

    fn payload(suspect_score: i64) -> String {
        json!({
            "products": {
                "identification": {"data": {"visitorId": "Ibk1527CUFmcnjLwIs4A9", "timestamp": NOW_MS}},
                "botd": {"data": {"bot": {"result": "notDetected"}}},
                "suspectScore": {"data": {"result": suspect_score}},
                "ipBlocklist": {"data": {"result": false}},
                "tampering": {"data": {"result": false}}
            }
        })
        .to_string()
    }

    #[test]
    fn test_end_to_end_allow() {
        let sealed = seal_signals(&payload(0), &key(), &NONCE).unwrap();
        let verdict = gate().check_at(&sealed, &ctx());

        assert_eq!(verdict.decision, Decision::Allow);
        assert!(verdict.failure.is_none());
        assert!(verdict.evidence.is_none());
    }

    #[test]
    fn test_end_to_end_suspect_score_deny() {
        let sealed = seal_signals(&payload(11), &key(), &NONCE).unwrap();
        let verdict = gate().check_at(&sealed, &ctx());

        assert_eq!(verdict.decision, Decision::deny(403, "Suspect score!"));
        assert_eq!(verdict.evidence.unwrap().rule_id, "R3_SUSPECT_SCORE");
    }

    #[test]
    fn test_unseal_signals() {
        let sealed = seal_signals(&payload(3), &key(), &NONCE).unwrap();
        let signals = gate().unseal_signals(&sealed).unwrap();

        assert_eq!(
            signals
                .str_at("products.identification.data.visitorId")
                .unwrap(),
            "Ibk1527CUFmcnjLwIs4A9"
        );
    }

    #[test]
    fn test_wrong_key_fails_closed() {
        let sealed =
            seal_signals(&payload(0), &SecretKey::from_bytes([8u8; 32]), &NONCE).unwrap();
        let verdict = gate().check_at(&sealed, &ctx());

        assert_eq!(verdict.decision, Decision::malformed());
        let failure = verdict.failure.unwrap();
        assert_eq!(failure, GateError::Crypto(CryptoError::AuthenticationFailed));
        assert_eq!(failure.kind(), "crypto");
        assert!(failure.is_tampering());
    }

    #[test]
    fn test_bad_magic_even_if_decryptable() {
        let sealed = seal_signals(&payload(0), &key(), &NONCE).unwrap();
        let mut bytes = BASE64.decode(sealed).unwrap();
        bytes[3] = 0xEE;

        let verdict = gate().check_at(&BASE64.encode(bytes), &ctx());
        assert!(matches!(
            verdict.failure,
            Some(GateError::Framing(FramingError::BadMagic { .. }))
        ));
        assert_eq!(verdict.decision, Decision::malformed());
    }

    #[test]
    fn test_short_blob_fails_closed() {
        let verdict = gate().check_at(&BASE64.encode([0x9E, 0x85, 0xDC, 0xED]), &ctx());
        assert_eq!(verdict.failure.unwrap().kind(), "framing");
    }

    #[test]
    fn test_non_json_payload_fails_closed() {
        let sealed = seal_signals("definitely not json", &key(), &NONCE).unwrap();
        let verdict = gate().check_at(&sealed, &ctx());

        assert_eq!(verdict.failure.unwrap().kind(), "schema");
        assert_eq!(verdict.decision, Decision::malformed());
    }

    #[test]
    fn test_uncompressed_payload_fails_closed() {
        // Encrypted but never deflated; first byte 0xFF is a reserved block type
        let frame = seal(&[0xFF; 16], &key(), &NONCE).unwrap();
        let verdict = gate().check_at(&BASE64.encode(frame.to_bytes()), &ctx());

        assert_eq!(verdict.failure.unwrap().kind(), "decompress");
    }

    #[test]
    fn test_inflate_limit() {
        let sealed = seal_signals(&payload(0), &key(), &NONCE).unwrap();
        let verdict = gate().with_max_inflated_bytes(16).check_at(&sealed, &ctx());

        assert_eq!(verdict.failure.unwrap().kind(), "decompress");
    }

    #[test]
    fn test_missing_field_fails_closed() {
        let sealed = seal_signals(r#"{"products": {}}"#, &key(), &NONCE).unwrap();
        let verdict = gate().check_at(&sealed, &ctx());

        let failure = verdict.failure.unwrap();
        assert_eq!(failure.kind(), "rule_evaluation");
        assert!(!failure.is_tampering());
        assert_eq!(verdict.decision, Decision::malformed());
        assert!(verdict.evidence.is_none());
    }

    #[test]
    fn test_gate_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Gate>();
    }
}
