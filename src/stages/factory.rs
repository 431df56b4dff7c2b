use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::config::StageConfig;
use crate::stages::*;
use crate::traits::Stage;

/// Factory for creating stage instances from configuration
pub struct StageFactory;

impl StageFactory {
    /// Create a stage instance from configuration
    ///
    /// The `stage` field in the config determines which implementation to
    /// create:
    /// - "tag_assigner" -> TagAssignerStage (keyword classification)
    /// - "content_filter" -> ContentFilterStage (requires keyword + next_tag)
    /// - "case_formatter" -> CaseFormatterStage (mode + next_tag)
    /// - "terminal_sink" -> TerminalSinkStage (stdout)
    /// - "stub" -> StubStage (swallows records)
    pub fn create_stage(config: &StageConfig) -> Result<Arc<dyn Stage>, String> {
        match config.stage.as_str() {
            "tag_assigner" => {
                let options: TagAssignerConfig = Self::parse_options(config)?;
                Ok(Arc::new(TagAssignerStage::with_keywords(options)))
            }

            "content_filter" => {
                let options: ContentFilterConfig = Self::parse_options(config)?;
                Ok(Arc::new(ContentFilterStage::new(options)))
            }

            "case_formatter" => {
                let options: CaseFormatterConfig = Self::parse_options(config)?;
                Ok(Arc::new(CaseFormatterStage::new(options)))
            }

            "terminal_sink" => Ok(Arc::new(TerminalSinkStage::new())),

            "stub" => Ok(Arc::new(StubStage::swallowing())),

            // Add more stages here as they're implemented
            _ => Err(format!(
                "Unknown stage implementation: '{}'",
                config.stage
            )),
        }
    }

    /// Deserialize a stage's free-form options map into its typed config.
    fn parse_options<T: DeserializeOwned>(config: &StageConfig) -> Result<T, String> {
        let value = serde_yaml::to_value(&config.options)
            .map_err(|e| format!("Invalid options for stage '{}': {}", config.tag, e))?;
        serde_yaml::from_value(value)
            .map_err(|e| format!("Invalid options for stage '{}': {}", config.tag, e))
    }

    /// List all available stage implementations
    pub fn list_available_implementations() -> Vec<&'static str> {
        vec![
            "tag_assigner",
            "content_filter",
            "case_formatter",
            "terminal_sink",
            "stub",
        ]
    }

    /// Check if an implementation is available
    pub fn is_implementation_available(impl_name: &str) -> bool {
        Self::list_available_implementations().contains(&impl_name)
    }
}
