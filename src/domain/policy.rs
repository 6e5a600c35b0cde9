use serde::{Deserialize, Serialize};

use super::decision::DEFAULT_DENY_STATUS;

/// Default maximum age of the identification timestamp.
pub const DEFAULT_FRESHNESS_WINDOW_MS: u64 = 1000;

/// Largest freshness window that still fits a signed millisecond age.
pub const MAX_FRESHNESS_WINDOW_MS: u64 = i64::MAX as u64;

/// Default suspect score above which a request is denied.
pub const DEFAULT_SUSPECT_SCORE_THRESHOLD: f64 = 10.0;

/// Policy configuration defining rules and their parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy version identifier
    #[serde(rename = "policy_version")]
    pub version: String,

    /// Parameters used by rules
    #[serde(default)]
    pub params: RuleParams,

    /// Rule definitions, evaluated in this order
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

impl Policy {
    /// The built-in rule set used when no policy file is configured.
    pub fn reference() -> Self {
        let rule = |id: &str, rule_type: RuleType, message: &str| RuleDef {
            id: id.to_string(),
            rule_type,
            status: DEFAULT_DENY_STATUS,
            message: message.to_string(),
            field: None,
        };

        Policy {
            version: "builtin-1".to_string(),
            params: RuleParams::default(),
            rules: vec![
                rule(
                    "R1_STALE_TIMESTAMP",
                    RuleType::TimestampFreshness,
                    "Timestamp is older than 1 second!",
                ),
                rule("R2_BOT", RuleType::BotDetected, "Bots are forbidden!"),
                rule("R3_SUSPECT_SCORE", RuleType::SuspectScore, "Suspect score!"),
                rule("R4_IP_BLOCKLIST", RuleType::IpBlocklist, "IP Blocklist!"),
                rule("R5_TAMPERING", RuleType::Tampering, "Tampering is forbidden!"),
            ],
        }
    }
}

/// Parameters used by rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleParams {
    /// Maximum age of the identification timestamp in milliseconds
    #[serde(default = "default_freshness_window_ms")]
    pub freshness_window_ms: u64,

    /// Suspect score threshold (strictly greater denies)
    #[serde(default = "default_suspect_score_threshold")]
    pub suspect_score_threshold: f64,
}

fn default_freshness_window_ms() -> u64 {
    DEFAULT_FRESHNESS_WINDOW_MS
}

fn default_suspect_score_threshold() -> f64 {
    DEFAULT_SUSPECT_SCORE_THRESHOLD
}

impl Default for RuleParams {
    fn default() -> Self {
        RuleParams {
            freshness_window_ms: DEFAULT_FRESHNESS_WINDOW_MS,
            suspect_score_threshold: DEFAULT_SUSPECT_SCORE_THRESHOLD,
        }
    }
}

/// Rule type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Identification timestamp older than the freshness window
    TimestampFreshness,
    /// Bot detection result other than "notDetected"
    BotDetected,
    /// Suspect score above threshold
    SuspectScore,
    /// IP found on a blocklist
    IpBlocklist,
    /// Browser tampering detected
    Tampering,
}

impl RuleType {
    /// Signal path read by this rule type unless the definition overrides it.
    pub fn default_field(&self) -> &'static str {
        match self {
            RuleType::TimestampFreshness => "products.identification.data.timestamp",
            RuleType::BotDetected => "products.botd.data.bot.result",
            RuleType::SuspectScore => "products.suspectScore.data.result",
            RuleType::IpBlocklist => "products.ipBlocklist.data.result",
            RuleType::Tampering => "products.tampering.data.result",
        }
    }
}

/// Definition of a single rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDef {
    /// Unique rule identifier
    pub id: String,

    /// Rule type
    #[serde(rename = "type")]
    pub rule_type: RuleType,

    /// HTTP status returned when the rule triggers
    #[serde(default = "default_status")]
    pub status: u16,

    /// Response body returned when the rule triggers
    pub message: String,

    /// Signal path override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

fn default_status() -> u16 {
    DEFAULT_DENY_STATUS
}

impl RuleDef {
    /// Signal path this rule reads.
    pub fn field_path(&self) -> &str {
        self.field
            .as_deref()
            .unwrap_or_else(|| self.rule_type.default_field())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_deserialization() {
        let yaml = r#"
policy_version: "2024-06-01.1"
params:
  freshness_window_ms: 5000
  suspect_score_threshold: 20
rules:
  - id: R2_BOT
    type: bot_detected
    message: "Bots are forbidden!"
  - id: R4_IP
    type: ip_blocklist
    status: 451
    message: "IP Blocklist!"
    field: products.ipBlocklist.data.details.emailSpam
"#;

        let policy: Policy = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(policy.version, "2024-06-01.1");
        assert_eq!(policy.params.freshness_window_ms, 5000);
        assert_eq!(policy.params.suspect_score_threshold, 20.0);
        assert_eq!(policy.rules.len(), 2);
        assert_eq!(policy.rules[0].status, 403);
        assert_eq!(policy.rules[0].field_path(), "products.botd.data.bot.result");
        assert_eq!(policy.rules[1].status, 451);
        assert_eq!(
            policy.rules[1].field_path(),
            "products.ipBlocklist.data.details.emailSpam"
        );
    }

    #[test]
    fn test_params_default_when_omitted() {
        let policy: Policy = serde_yaml::from_str("policy_version: v1\n").unwrap();

        assert_eq!(policy.params.freshness_window_ms, 1000);
        assert_eq!(policy.params.suspect_score_threshold, 10.0);
        assert!(policy.rules.is_empty());
    }

    #[test]
    fn test_reference_policy_order() {
        let policy = Policy::reference();
        let types: Vec<RuleType> = policy.rules.iter().map(|r| r.rule_type).collect();

        assert_eq!(
            types,
            vec![
                RuleType::TimestampFreshness,
                RuleType::BotDetected,
                RuleType::SuspectScore,
                RuleType::IpBlocklist,
                RuleType::Tampering,
            ]
        );
        assert!(policy.rules.iter().all(|r| r.status == 403));
    }

    #[test]
    fn test_unknown_rule_type_rejected() {
        let yaml = r#"
policy_version: v1
rules:
  - id: X
    type: velocity
    message: nope
"#;
        assert!(serde_yaml::from_str::<Policy>(yaml).is_err());
    }
}
