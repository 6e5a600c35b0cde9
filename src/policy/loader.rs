use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::domain::{Policy, MAX_FRESHNESS_WINDOW_MS};
use crate::rules::RuleSet;

/// Errors that can occur during policy loading.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Load a policy from a YAML file.
pub fn load_policy(path: impl AsRef<Path>) -> Result<Policy, PolicyError> {
    let content = fs::read_to_string(path)?;
    let policy: Policy = serde_yaml::from_str(&content)?;

    validate_policy(&policy)?;

    Ok(policy)
}

/// Validate policy configuration.
pub fn validate_policy(policy: &Policy) -> Result<(), PolicyError> {
    if policy.version.is_empty() {
        return Err(PolicyError::Validation(
            "Policy version cannot be empty".to_string(),
        ));
    }

    if policy.params.freshness_window_ms == 0 {
        return Err(PolicyError::Validation(
            "freshness_window_ms must be positive".to_string(),
        ));
    }

    if policy.params.freshness_window_ms > MAX_FRESHNESS_WINDOW_MS {
        return Err(PolicyError::Validation(format!(
            "freshness_window_ms must be at most {}",
            MAX_FRESHNESS_WINDOW_MS
        )));
    }

    if !policy.params.suspect_score_threshold.is_finite() {
        return Err(PolicyError::Validation(
            "suspect_score_threshold must be a finite number".to_string(),
        ));
    }

    // Check for duplicate rule IDs
    let mut seen_ids = HashSet::new();
    for rule in &policy.rules {
        if !seen_ids.insert(&rule.id) {
            return Err(PolicyError::Validation(format!(
                "Duplicate rule ID: {}",
                rule.id
            )));
        }

        if !(400..=599).contains(&rule.status) {
            return Err(PolicyError::Validation(format!(
                "Rule {} has non-error status {}",
                rule.id, rule.status
            )));
        }

        if rule.field_path().split('.').any(str::is_empty) {
            return Err(PolicyError::Validation(format!(
                "Rule {} has an invalid field path: {:?}",
                rule.id,
                rule.field_path()
            )));
        }
    }

    Ok(())
}

/// Loads the policy once at startup and applies operator overrides.
#[derive(Debug, Default)]
pub struct PolicyLoader {
    policy_path: Option<String>,
    freshness_window_ms: Option<u64>,
    suspect_score_threshold: Option<f64>,
}

impl PolicyLoader {
    /// Create a loader. Without a path the built-in reference policy is used.
    pub fn new(policy_path: Option<impl Into<String>>) -> Self {
        PolicyLoader {
            policy_path: policy_path.map(Into::into),
            ..Default::default()
        }
    }

    /// Override the freshness window from the policy file.
    pub fn with_freshness_window_ms(mut self, window_ms: Option<u64>) -> Self {
        self.freshness_window_ms = window_ms;
        self
    }

    /// Override the suspect score threshold from the policy file.
    pub fn with_suspect_score_threshold(mut self, threshold: Option<f64>) -> Self {
        self.suspect_score_threshold = threshold;
        self
    }

    /// Load the policy with overrides applied.
    pub fn load_policy(&self) -> Result<Policy, PolicyError> {
        let mut policy = match &self.policy_path {
            Some(path) => load_policy(path)?,
            None => Policy::reference(),
        };

        if let Some(window_ms) = self.freshness_window_ms {
            policy.params.freshness_window_ms = window_ms;
        }
        if let Some(threshold) = self.suspect_score_threshold {
            policy.params.suspect_score_threshold = threshold;
        }

        validate_policy(&policy)?;
        Ok(policy)
    }

    /// Load the policy and compile it into a RuleSet.
    pub fn load(&self) -> Result<(Policy, RuleSet), PolicyError> {
        let policy = self.load_policy()?;
        let ruleset = RuleSet::from_policy(&policy);

        Ok((policy, ruleset))
    }

    /// Get the policy file path.
    pub fn policy_path(&self) -> Option<&str> {
        self.policy_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn policy_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_policy() {
        let file = policy_file(
            r#"
policy_version: "test-1.0"
params:
  freshness_window_ms: 2000
  suspect_score_threshold: 15
rules:
  - id: R2_BOT
    type: bot_detected
    message: "Bots are forbidden!"
  - id: R5_TAMPERING
    type: tampering
    message: "Tampering is forbidden!"
"#,
        );

        let policy = load_policy(file.path()).unwrap();

        assert_eq!(policy.version, "test-1.0");
        assert_eq!(policy.rules.len(), 2);
        assert_eq!(policy.params.freshness_window_ms, 2000);
        assert_eq!(policy.params.suspect_score_threshold, 15.0);
    }

    #[test]
    fn test_policy_validation_empty_version() {
        let file = policy_file(
            r#"
policy_version: ""
rules: []
"#,
        );

        let result = load_policy(file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("version"));
    }

    #[test]
    fn test_policy_validation_duplicate_ids() {
        let file = policy_file(
            r#"
policy_version: "test"
rules:
  - id: R1
    type: ip_blocklist
    message: a
  - id: R1
    type: tampering
    message: b
"#,
        );

        let result = load_policy(file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Duplicate"));
    }

    #[test]
    fn test_policy_validation_status() {
        let file = policy_file(
            r#"
policy_version: "test"
rules:
  - id: R1
    type: tampering
    status: 200
    message: "looks fine"
"#,
        );

        let err = load_policy(file.path()).unwrap_err();
        assert!(err.to_string().contains("non-error status"));
    }

    #[test]
    fn test_policy_validation_field_path() {
        let file = policy_file(
            r#"
policy_version: "test"
rules:
  - id: R1
    type: tampering
    message: x
    field: "products..result"
"#,
        );

        let err = load_policy(file.path()).unwrap_err();
        assert!(err.to_string().contains("field path"));
    }

    #[test]
    fn test_shipped_policy_matches_builtin() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/policies/reference.yaml");
        assert_eq!(load_policy(path).unwrap(), Policy::reference());
    }

    #[test]
    fn test_missing_file() {
        let loader = PolicyLoader::new(Some("/nonexistent/policy.yaml"));
        assert!(matches!(loader.load(), Err(PolicyError::Io(_))));
    }

    #[test]
    fn test_loader_defaults_to_reference() {
        let loader = PolicyLoader::new(None::<String>);
        let (policy, ruleset) = loader.load().unwrap();

        assert_eq!(policy, Policy::reference());
        assert_eq!(ruleset.len(), 5);
        assert!(loader.policy_path().is_none());
    }

    #[test]
    fn test_loader_overrides() {
        let file = policy_file(
            r#"
policy_version: "test-1.0"
params:
  freshness_window_ms: 2000
rules:
  - id: R3
    type: suspect_score
    message: "Suspect score!"
"#,
        );

        let loader = PolicyLoader::new(Some(file.path().to_string_lossy()))
            .with_freshness_window_ms(Some(500))
            .with_suspect_score_threshold(Some(30.0));

        let (policy, ruleset) = loader.load().unwrap();

        assert_eq!(policy.params.freshness_window_ms, 500);
        assert_eq!(policy.params.suspect_score_threshold, 30.0);
        assert_eq!(ruleset.policy_version, "test-1.0");
        assert_eq!(ruleset.len(), 1);
    }

    #[test]
    fn test_override_validated() {
        let loader = PolicyLoader::new(None::<String>).with_freshness_window_ms(Some(0));
        assert!(matches!(loader.load(), Err(PolicyError::Validation(_))));
    }

    #[test]
    fn test_window_upper_bound() {
        let loader = PolicyLoader::new(None::<String>).with_freshness_window_ms(Some(u64::MAX));
        let err = loader.load_policy().unwrap_err();
        assert!(err.to_string().contains("at most"));

        let loader = PolicyLoader::new(None::<String>)
            .with_freshness_window_ms(Some(MAX_FRESHNESS_WINDOW_MS));
        assert!(loader.load_policy().is_ok());
    }
}
