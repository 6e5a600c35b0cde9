//! Benchmarks for per-request gate latency.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sealgate::domain::{Policy, SignalRecord};
use sealgate::gate::{seal_signals, Gate};
use sealgate::rules::{EvalContext, RuleSet};
use sealgate::sealed::{deflate, inflate, unseal, SealedFrame, SecretKey, DEFAULT_MAX_INFLATED_BYTES};

const NOW_MS: i64 = 1_700_000_000_000;
const NONCE: [u8; 12] = [7; 12];

fn key() -> SecretKey {
    SecretKey::from_bytes([42; 32])
}

fn context() -> EvalContext {
    EvalContext::new(Utc.timestamp_millis_opt(NOW_MS).unwrap())
}

fn clean_payload() -> String {
    serde_json::json!({
        "products": {
            "identification": { "data": { "timestamp": NOW_MS - 200, "requestId": "bench" } },
            "botd": { "data": { "bot": { "result": "notDetected" } } },
            "suspectScore": { "data": { "result": 2 } },
            "ipBlocklist": { "data": { "result": false } },
            "tampering": { "data": { "result": false } }
        }
    })
    .to_string()
}

fn bench_frame_parse(c: &mut Criterion) {
    let sealed = seal_signals(&clean_payload(), &key(), &NONCE).unwrap();

    c.bench_function("frame_parse", |b| {
        b.iter(|| SealedFrame::parse(black_box(&sealed)))
    });
}

fn bench_unseal(c: &mut Criterion) {
    let key = key();
    let sealed = seal_signals(&clean_payload(), &key, &NONCE).unwrap();
    let frame = SealedFrame::parse(&sealed).unwrap();

    c.bench_function("unseal", |b| b.iter(|| unseal(black_box(&frame), &key)));
}

fn bench_inflate(c: &mut Criterion) {
    let compressed = deflate(&clean_payload()).unwrap();

    c.bench_function("inflate", |b| {
        b.iter(|| inflate(black_box(&compressed), DEFAULT_MAX_INFLATED_BYTES))
    });
}

fn bench_ruleset_evaluate(c: &mut Criterion) {
    let ruleset = RuleSet::from_policy(&Policy::reference());
    let signals = SignalRecord::from_json(&clean_payload()).unwrap();
    let ctx = context();

    c.bench_function("ruleset_evaluate_allow", |b| {
        b.iter(|| ruleset.evaluate(black_box(&signals), &ctx))
    });
}

fn bench_full_gate(c: &mut Criterion) {
    let gate = Gate::new(key(), Arc::new(RuleSet::from_policy(&Policy::reference())));
    let sealed = seal_signals(&clean_payload(), &key(), &NONCE).unwrap();
    let ctx = context();

    c.bench_function("gate_check_allow", |b| {
        b.iter(|| gate.check_at(black_box(&sealed), &ctx))
    });

    let mut tampered = SealedFrame::parse(&sealed).unwrap().to_bytes();
    let last = tampered.len() - 1;
    tampered[last] ^= 0x01;
    let tampered = BASE64.encode(tampered);

    c.bench_function("gate_check_tampered", |b| {
        b.iter(|| gate.check_at(black_box(&tampered), &ctx))
    });
}

criterion_group!(
    benches,
    bench_frame_parse,
    bench_unseal,
    bench_inflate,
    bench_ruleset_evaluate,
    bench_full_gate,
);

criterion_main!(benches);
