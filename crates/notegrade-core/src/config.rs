use crate::engine::batch::BatchPolicy;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

const SAMPLE_CONFIG: &str = r#"# notegrade configuration
version: 1

judge:
  provider: openai        # openai | fake
  model: gpt-4o-mini
  temperature: 0.0
  max_tokens: 2000
  timeout_secs: 120

batch:
  direct_limit: 5         # up to this many tasks: direct strategy
  chunk_limit: 100        # up to this many tasks: chunked strategy, above: partial cap
  chunk_size: 5
  hard_cap: 50
  direct_delay_ms: 1000
  chunk_delay_ms: 100

# File stems treated as the reference document inside a group folder.
reference_names:
  - transcript
  - reference
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvalConfig {
    pub version: u32,
    #[serde(default)]
    pub judge: JudgeSettings,
    #[serde(default)]
    pub batch: BatchPolicy,
    #[serde(default = "default_reference_names")]
    pub reference_names: Vec<String>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            judge: JudgeSettings::default(),
            batch: BatchPolicy::default(),
            reference_names: default_reference_names(),
        }
    }
}

fn default_reference_names() -> Vec<String> {
    vec!["transcript".to_string(), "reference".to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JudgeSettings {
    /// "openai" or "fake"
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Override for OpenAI-compatible endpoints.
    pub base_url: Option<String>,
}

impl Default for JudgeSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: 2000,
            timeout_secs: 120,
            base_url: None,
        }
    }
}

pub fn load_config(path: &Path) -> Result<EvalConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&raw)
}

pub fn parse_config(raw: &str) -> Result<EvalConfig, ConfigError> {
    let cfg: EvalConfig = serde_yaml::from_str(raw)?;
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion {
            found: cfg.version,
            supported: SUPPORTED_CONFIG_VERSION,
        });
    }
    cfg.batch.validate().map_err(ConfigError::Invalid)?;
    if cfg.reference_names.is_empty() {
        return Err(ConfigError::Invalid(
            "reference_names must list at least one file stem".into(),
        ));
    }
    Ok(cfg)
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, SAMPLE_CONFIG).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn sample_config_round_trips_to_defaults() {
        let cfg = parse_config(SAMPLE_CONFIG).unwrap();
        assert_eq!(cfg, EvalConfig::default());
        assert_eq!(cfg.batch.direct_delay(), Duration::from_millis(1000));
        assert_eq!(cfg.batch.chunk_delay(), Duration::from_millis(100));
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let cfg = parse_config("version: 1\n").unwrap();
        assert_eq!(cfg.judge.provider, "openai");
        assert_eq!(cfg.batch.hard_cap, 50);
        assert_eq!(cfg.reference_names, vec!["transcript", "reference"]);
    }

    #[test]
    fn rejects_unknown_fields_and_versions() {
        let err = parse_config("version: 1\nparallel: 8\n").unwrap_err();
        assert!(err.to_string().contains("unknown field"), "{err}");

        let err = parse_config("version: 2\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedVersion {
                found: 2,
                supported: 1
            }
        ));
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let err = parse_config("version: 1\nbatch:\n  chunk_size: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_hard_cap_above_chunk_limit() {
        let err = parse_config("version: 1\nbatch:\n  hard_cap: 200\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
        assert!(err.to_string().contains("batch.hard_cap (200)"), "{err}");

        let cfg = parse_config("version: 1\nbatch:\n  hard_cap: 100\n").unwrap();
        assert_eq!(cfg.batch.hard_cap, 100);
    }

    #[test]
    fn write_failure_is_reported_as_write() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_sample_config(&dir.path().join("no/such/dir/notegrade.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Write { .. }));
        assert!(err.to_string().starts_with("failed to write config"), "{err}");
    }

    #[test]
    fn load_and_write_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notegrade.yaml");
        write_sample_config(&path).unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.judge.model, "gpt-4o-mini");

        let missing = load_config(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(missing.to_string().contains("failed to read config"));
    }
}
