use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::StageError;
use crate::record::Record;
use crate::traits::{Stage, StageKind};

/// Configuration for the Content Filter stage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentFilterConfig {
    /// Records whose content contains this keyword pass the filter.
    pub keyword: String,
    /// Tag survivors are re-routed to.
    pub next_tag: String,
}

/// Content Filter stage - passes matching records through, drops the rest
///
/// Non-matching records are discarded silently: the stage emits nothing for
/// them, which ends their journey without an error entry.
pub struct ContentFilterStage {
    config: ContentFilterConfig,
}

impl ContentFilterStage {
    pub fn new(config: ContentFilterConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Stage for ContentFilterStage {
    async fn process(&self, record: Record) -> Result<Vec<Record>, StageError> {
        if record.content.contains(&self.config.keyword) {
            Ok(vec![record.pass(&self.config.next_tag)])
        } else {
            Ok(Vec::new())
        }
    }

    fn name(&self) -> &'static str {
        "content_filter"
    }

    fn kind(&self) -> StageKind {
        StageKind::Filter
    }

    fn declared_routes(&self) -> Vec<String> {
        vec![self.config.next_tag.clone()]
    }
}
