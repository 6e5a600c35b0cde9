use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::observability::LogFormat;
use crate::sealed::{CryptoError, SecretKey, DEFAULT_MAX_INFLATED_BYTES};

/// Gate configuration.
///
/// Built once at startup; the key and thresholds are handed to the pipeline
/// from here and never read from ambient state afterwards.
#[derive(Clone, Parser)]
#[command(name = "sealgate")]
#[command(about = "Edge gate that admits or rejects requests based on sealed risk signals")]
pub struct Config {
    /// HTTP server listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "SEALGATE_LISTEN_ADDR")]
    pub listen_addr: String,

    /// Origin that allowed requests are forwarded to
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "SEALGATE_ORIGIN_URL")]
    pub origin_url: String,

    /// Base64-encoded 256-bit decryption key for sealed results
    #[arg(long, env = "SEALGATE_ENCRYPTION_KEY", hide_env_values = true)]
    pub encryption_key: String,

    /// Path to policy YAML file (built-in rules if not set)
    #[arg(long, env = "SEALGATE_POLICY_PATH")]
    pub policy_path: Option<PathBuf>,

    /// Override the policy's timestamp freshness window in milliseconds
    #[arg(long, env = "SEALGATE_FRESHNESS_WINDOW_MS")]
    pub freshness_window_ms: Option<u64>,

    /// Override the policy's suspect score threshold
    #[arg(long, env = "SEALGATE_SUSPECT_SCORE_THRESHOLD")]
    pub suspect_score_threshold: Option<f64>,

    /// Maximum accepted request body size in bytes
    #[arg(long, default_value = "65536", env = "SEALGATE_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// Maximum inflated signal payload size in bytes
    #[arg(long, default_value = "1048576", env = "SEALGATE_MAX_INFLATED_BYTES")]
    pub max_inflated_bytes: usize,

    /// Timeout for forwarded origin requests in seconds
    #[arg(long, default_value = "30", env = "SEALGATE_UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "SEALGATE_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Enable graceful shutdown
    #[arg(long, default_value = "true", env = "SEALGATE_GRACEFUL_SHUTDOWN", action = clap::ArgAction::Set)]
    pub graceful_shutdown: bool,
}

impl Config {
    /// Get origin request timeout as Duration.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Decode the configured key.
    pub fn secret_key(&self) -> Result<SecretKey, CryptoError> {
        SecretKey::from_base64(&self.encryption_key)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("origin_url", &self.origin_url)
            .field("encryption_key", &"[REDACTED]")
            .field("policy_path", &self.policy_path)
            .field("freshness_window_ms", &self.freshness_window_ms)
            .field("suspect_score_threshold", &self.suspect_score_threshold)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("max_inflated_bytes", &self.max_inflated_bytes)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("graceful_shutdown", &self.graceful_shutdown)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: "0.0.0.0:8080".to_string(),
            origin_url: "http://127.0.0.1:3000".to_string(),
            encryption_key: String::new(),
            policy_path: None,
            freshness_window_ms: None,
            suspect_score_threshold: None,
            max_body_bytes: 64 * 1024,
            max_inflated_bytes: DEFAULT_MAX_INFLATED_BYTES,
            upstream_timeout_secs: 30,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            graceful_shutdown: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_B64: &str = "QkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkI=";

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.max_body_bytes, 65536);
        assert_eq!(config.max_inflated_bytes, 1048576);
        assert!(config.policy_path.is_none());
    }

    #[test]
    fn test_parse_args() {
        let config = Config::try_parse_from([
            "sealgate",
            "--encryption-key",
            KEY_B64,
            "--origin-url",
            "http://origin.internal:9000",
            "--suspect-score-threshold",
            "25",
            "--graceful-shutdown",
            "false",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(config.origin_url, "http://origin.internal:9000");
        assert_eq!(config.suspect_score_threshold, Some(25.0));
        assert_eq!(config.freshness_window_ms, None);
        assert!(!config.graceful_shutdown);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.secret_key().unwrap().as_bytes(), &[0x42; 32]);
    }

    #[test]
    fn test_duration_helpers() {
        let config = Config {
            upstream_timeout_secs: 5,
            ..Default::default()
        };

        assert_eq!(config.upstream_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config {
            encryption_key: KEY_B64.to_string(),
            ..Default::default()
        };

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains(KEY_B64));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_bad_key_rejected() {
        let config = Config {
            encryption_key: "c2hvcnQ=".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            config.secret_key().unwrap_err(),
            CryptoError::InvalidKeyLength { actual: 5, .. }
        ));
    }
}
