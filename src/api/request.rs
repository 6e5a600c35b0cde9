use serde::{Deserialize, Serialize};

/// Body the gate expects on every protected request.
///
/// Only `fingerprintData.sealedResult` is read; the rest of the body is
/// forwarded untouched and ignored here.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateRequest {
    pub fingerprint_data: FingerprintData,
}

/// Vendor data attached by the client agent.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintData {
    /// Base64 sealed result
    pub sealed_result: String,
}

impl GateRequest {
    /// Parse a raw request body.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn sealed_result(&self) -> &str {
        &self.fingerprint_data.sealed_result
    }
}
