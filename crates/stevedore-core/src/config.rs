// crates/stevedore-core/src/config.rs
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, StevedoreResult};
use crate::types::{FailurePolicy, Module, SecretEntry};

/// Which branches start a run.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Trigger {
    #[serde(default)]
    pub branches: Vec<String>,
}

impl Trigger {
    /// An empty branch list tracks every branch.
    pub fn tracks(&self, branch: &str) -> bool {
        self.branches.is_empty() || self.branches.iter().any(|b| b == branch)
    }
}

/// The pipeline definition: trigger, secret declarations, the ordered module
/// list, and the failure policy.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PipelineConfig {
    #[serde(default = "default_pipeline_name")]
    pub name: String,
    #[serde(default)]
    pub trigger: Trigger,
    #[serde(default)]
    pub secrets: Vec<SecretEntry>,
    pub modules: Vec<Module>,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

fn default_pipeline_name() -> String {
    "deploy".to_string()
}

/// Parse a pipeline definition from YAML content.
pub fn parse_pipeline_yaml(yaml_content: &str) -> StevedoreResult<PipelineConfig> {
    if yaml_content.trim().is_empty() {
        return Err(ConfigError::MissingField("pipeline definition is empty".to_string()).into());
    }
    let config: PipelineConfig = serde_yaml::from_str(yaml_content)?;
    debug!(
        "Parsed pipeline '{}' with {} module(s)",
        config.name,
        config.modules.len()
    );
    Ok(config)
}

/// Read and parse a pipeline definition file.
pub async fn load_pipeline_file(path: impl AsRef<Path>) -> StevedoreResult<PipelineConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()).into());
    }
    let yaml_content = tokio::fs::read_to_string(path).await?;
    parse_pipeline_yaml(&yaml_content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StevedoreError;

    const SAMPLE: &str = r#"
name: deploy
trigger:
  branches: [main, release]
secrets:
  - key: DATABASE_URL
    value_template: ${DATABASE_URL}
modules:
  - name: badges
    working_directory: lms/djangoapps/badges
  - name: branding
    working_directory: lms/djangoapps/branding
    commands:
      - ./deploy.sh
failure_policy: halt_on_error
"#;

    #[test]
    fn parses_a_full_definition() {
        let config = parse_pipeline_yaml(SAMPLE).unwrap();
        assert_eq!(config.name, "deploy");
        assert!(config.trigger.tracks("main"));
        assert!(!config.trigger.tracks("feature/x"));
        assert_eq!(config.secrets.len(), 1);
        assert_eq!(config.modules.len(), 2);
        assert!(config.modules[0].commands.is_empty());
        assert_eq!(config.modules[1].commands, vec!["./deploy.sh".to_string()]);
        assert_eq!(config.failure_policy, FailurePolicy::HaltOnError);
    }

    #[test]
    fn defaults_apply_when_fields_are_omitted() {
        let config = parse_pipeline_yaml("modules: []").unwrap();
        assert_eq!(config.name, "deploy");
        assert!(config.secrets.is_empty());
        assert_eq!(config.failure_policy, FailurePolicy::ContinueOnError);
        // No trigger section tracks every branch.
        assert!(config.trigger.tracks("anything"));
    }

    #[test]
    fn empty_content_is_rejected() {
        let err = parse_pipeline_yaml("   \n").unwrap_err();
        assert!(matches!(
            err,
            StevedoreError::Config(ConfigError::MissingField(_))
        ));
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let err = parse_pipeline_yaml("modules: [unclosed").unwrap_err();
        assert!(matches!(
            err,
            StevedoreError::Config(ConfigError::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn missing_file_is_rejected() {
        let err = load_pipeline_file("/nonexistent/pipeline.yaml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StevedoreError::Config(ConfigError::FileNotFound(_))
        ));
    }
}
