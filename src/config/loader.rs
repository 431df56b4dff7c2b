// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_ERROR_CAPACITY, DEFAULT_INGRESS_TAG, DEFAULT_MAX_ITERATIONS, DEFAULT_TRACE_CAPACITY,
};
use crate::errors::ConfigError;
use crate::traits::StageKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main configuration structure for the routing engine.
///
/// Represents a complete tag-routed pipeline: the ordered stage definitions
/// plus engine and observability options. Typically loaded from a YAML file.
///
/// # Fields
/// * `ingress_tag` - Tag the CLI seeds input lines under (defaults to "start")
/// * `max_iterations` - Drain safety bound in batches; 0 disables the bound
/// * `observability` - Ring capacities for recent traces/errors (optional)
/// * `stages` - Ordered stage definitions, one per tag
///
/// # Example
/// ```yaml
/// max_iterations: 10000
/// observability:
///   trace_capacity: 256
///   error_capacity: 64
/// stages:
///   - tag: start
///     kind: source
///     stage: tag_assigner
///   - tag: end
///     kind: sink
///     stage: terminal_sink
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_ingress_tag")]
    pub ingress_tag: String,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    pub stages: Vec<StageConfig>,
}

fn default_ingress_tag() -> String {
    DEFAULT_INGRESS_TAG.to_string()
}

fn default_max_iterations() -> u64 {
    DEFAULT_MAX_ITERATIONS
}

/// Ring capacities for the observability store.
///
/// Both values are optional and fall back to built-in defaults. Capacities
/// bound the "recent N" windows the dashboard serves; metrics counters are
/// unbounded by design.
#[derive(Debug, Deserialize, Default)]
pub struct ObservabilityConfig {
    pub trace_capacity: Option<usize>,
    pub error_capacity: Option<usize>,
}

impl ObservabilityConfig {
    /// Get the trace ring capacity, using the built-in default if not configured.
    pub fn get_trace_capacity(&self) -> usize {
        self.trace_capacity.unwrap_or(DEFAULT_TRACE_CAPACITY)
    }

    /// Get the error ring capacity, using the built-in default if not configured.
    pub fn get_error_capacity(&self) -> usize {
        self.error_capacity.unwrap_or(DEFAULT_ERROR_CAPACITY)
    }
}

/// Configuration for a single stage in the routing graph.
///
/// Each entry binds one tag to one stage implementation. The `options` map is
/// implementation-specific and deserialized into the stage's typed config by
/// the factory.
///
/// # Example
/// ```yaml
/// tag: "error"
/// kind: filter
/// stage: "content_filter"
/// options:
///   keyword: "ERROR"
///   next_tag: "general"
/// ```
#[derive(Debug, Deserialize)]
pub struct StageConfig {
    pub tag: String,
    pub kind: StageKind,
    pub stage: String,
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>, // stage-specific options
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load and validate a config from a YAML file
///
/// Loads the configuration and validates the stage graph's statically
/// checkable structure (tag uniqueness). Route targets are validated once
/// stages are constructed, in `StageRegistry::from_config`.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;

    if let Err(validation_errors) = crate::config::validate_stage_graph(&cfg) {
        return Err(ConfigError::Validation(validation_errors));
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml;

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
stages:
  - tag: start
    kind: source
    stage: tag_assigner
  - tag: end
    kind: sink
    stage: terminal_sink
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.stages.len(), 2);
        assert_eq!(cfg.stages[0].tag, "start");
        assert_eq!(cfg.stages[0].kind, StageKind::Source);
        assert_eq!(cfg.stages[1].stage, "terminal_sink");
        // Defaults apply when omitted
        assert_eq!(cfg.ingress_tag, "start");
        assert_eq!(cfg.max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn test_parse_stage_with_options() {
        let yaml = r#"
stages:
  - tag: error
    kind: filter
    stage: content_filter
    options:
      keyword: "ERROR"
      next_tag: general
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        let stage = &cfg.stages[0];

        assert_eq!(stage.options.len(), 2);
        assert!(stage.options.contains_key("keyword"));
        assert!(stage.options.contains_key("next_tag"));
    }

    #[test]
    fn test_observability_defaults() {
        let yaml = r#"
stages:
  - tag: end
    kind: sink
    stage: terminal_sink
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(cfg.observability.get_trace_capacity(), 256);
        assert_eq!(cfg.observability.get_error_capacity(), 64);
    }

    #[test]
    fn test_observability_partial_override() {
        let yaml = r#"
observability:
  trace_capacity: 16
stages:
  - tag: end
    kind: sink
    stage: terminal_sink
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(cfg.observability.get_trace_capacity(), 16);
        assert_eq!(cfg.observability.get_error_capacity(), 64);
    }

    #[test]
    fn test_load_and_validate_valid_config() {
        let yaml = r#"
stages:
  - tag: start
    kind: source
    stage: tag_assigner
  - tag: end
    kind: sink
    stage: terminal_sink
"#;

        let temp_dir = std::env::temp_dir();
        let temp_file = temp_dir.join("tagflow_test_config.yaml");
        std::fs::write(&temp_file, yaml).unwrap();

        let result = load_and_validate_config(&temp_file);
        assert!(result.is_ok());

        std::fs::remove_file(&temp_file).unwrap();
    }

    #[test]
    fn test_load_and_validate_duplicate_tag() {
        let yaml = r#"
stages:
  - tag: start
    kind: source
    stage: tag_assigner
  - tag: start
    kind: sink
    stage: terminal_sink
"#;

        let temp_dir = std::env::temp_dir();
        let temp_file = temp_dir.join("tagflow_test_duplicate_config.yaml");
        std::fs::write(&temp_file, yaml).unwrap();

        let result = load_and_validate_config(&temp_file);
        assert!(result.is_err());
        let error_msg = result.unwrap_err().to_string();
        assert!(error_msg.contains("registered more than once"));

        std::fs::remove_file(&temp_file).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/tagflow.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
