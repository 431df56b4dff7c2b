use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::errors::StageError;
use crate::record::Record;
use crate::traits::{Stage, StageKind};

/// Configuration for the Tag Assigner stage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagAssignerConfig {
    #[serde(default = "default_error_tag")]
    pub error_tag: String,
    #[serde(default = "default_warn_tag")]
    pub warn_tag: String,
    #[serde(default = "default_general_tag")]
    pub general_tag: String,
}

fn default_error_tag() -> String {
    "error".to_string()
}

fn default_warn_tag() -> String {
    "warn".to_string()
}

fn default_general_tag() -> String {
    "general".to_string()
}

impl Default for TagAssignerConfig {
    fn default() -> Self {
        Self {
            error_tag: default_error_tag(),
            warn_tag: default_warn_tag(),
            general_tag: default_general_tag(),
        }
    }
}

/// Classification policy deciding which tag an ingress record gets next.
///
/// Injected into [`TagAssignerStage`] so tests and demos can substitute a
/// deterministic sequence for the production keyword rule.
pub trait TagPolicy: Send + Sync {
    fn assign(&self, record: &Record) -> String;

    /// Tags this policy can assign, for startup route validation.
    fn routes(&self) -> Vec<String>;
}

/// Production classification: keyword matching on the record content.
///
/// "ERROR" routes to the error tag, "WARN" to the warn tag, everything else
/// to the general tag.
pub struct KeywordPolicy {
    config: TagAssignerConfig,
}

impl KeywordPolicy {
    pub fn new(config: TagAssignerConfig) -> Self {
        Self { config }
    }
}

impl TagPolicy for KeywordPolicy {
    fn assign(&self, record: &Record) -> String {
        if record.content.contains("ERROR") {
            self.config.error_tag.clone()
        } else if record.content.contains("WARN") {
            self.config.warn_tag.clone()
        } else {
            self.config.general_tag.clone()
        }
    }

    fn routes(&self) -> Vec<String> {
        vec![
            self.config.error_tag.clone(),
            self.config.warn_tag.clone(),
            self.config.general_tag.clone(),
        ]
    }
}

/// Deterministic fixed-sequence policy for tests and demos.
///
/// Pops the next tag from the configured sequence; once exhausted, falls back
/// to the fallback tag.
pub struct SequencePolicy {
    sequence: Mutex<VecDeque<String>>,
    fallback: String,
}

impl SequencePolicy {
    pub fn new(sequence: Vec<String>, fallback: impl Into<String>) -> Self {
        Self {
            sequence: Mutex::new(sequence.into_iter().collect()),
            fallback: fallback.into(),
        }
    }
}

impl TagPolicy for SequencePolicy {
    fn assign(&self, _record: &Record) -> String {
        self.sequence
            .lock()
            .expect("sequence policy poisoned")
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn routes(&self) -> Vec<String> {
        let sequence = self.sequence.lock().expect("sequence policy poisoned");
        let mut routes: Vec<String> = sequence.iter().cloned().collect();
        routes.push(self.fallback.clone());
        routes.dedup();
        routes
    }
}

/// Tag Assigner stage - classifies ingress records onto their first real tag
pub struct TagAssignerStage {
    policy: Box<dyn TagPolicy>,
}

impl TagAssignerStage {
    pub fn new(policy: Box<dyn TagPolicy>) -> Self {
        Self { policy }
    }

    pub fn with_keywords(config: TagAssignerConfig) -> Self {
        Self::new(Box::new(KeywordPolicy::new(config)))
    }
}

#[async_trait]
impl Stage for TagAssignerStage {
    async fn process(&self, record: Record) -> Result<Vec<Record>, StageError> {
        let next_tag = self.policy.assign(&record);
        Ok(vec![record.pass(next_tag)])
    }

    fn name(&self) -> &'static str {
        "tag_assigner"
    }

    fn kind(&self) -> StageKind {
        StageKind::Source
    }

    fn declared_routes(&self) -> Vec<String> {
        self.policy.routes()
    }
}
