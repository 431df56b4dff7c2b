// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::StageError;
use crate::record::Record;
use crate::traits::{Stage, StageKind};

/// A stub stage for testing and placeholder purposes
///
/// Forwards every record unchanged to a fixed next tag, or swallows it when
/// no next tag is configured.
pub struct StubStage {
    pub next_tag: Option<String>,
}

impl StubStage {
    pub fn forwarding(next_tag: impl Into<String>) -> Self {
        Self {
            next_tag: Some(next_tag.into()),
        }
    }

    pub fn swallowing() -> Self {
        Self { next_tag: None }
    }
}

#[async_trait::async_trait]
impl Stage for StubStage {
    async fn process(&self, record: Record) -> Result<Vec<Record>, StageError> {
        match &self.next_tag {
            Some(next_tag) => Ok(vec![record.pass(next_tag)]),
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }

    fn kind(&self) -> StageKind {
        match self.next_tag {
            Some(_) => StageKind::Transform,
            None => StageKind::Sink,
        }
    }

    fn declared_routes(&self) -> Vec<String> {
        self.next_tag.iter().cloned().collect()
    }
}

/// A stage that fails only for one designated content value
///
/// Drives the per-record isolation tests: one poisoned record in a batch must
/// degrade to a single error entry while the rest pass through.
pub struct FailOnContentStage {
    pub needle: String,
    pub next_tag: String,
}

impl FailOnContentStage {
    pub fn new(needle: impl Into<String>, next_tag: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
            next_tag: next_tag.into(),
        }
    }
}

#[async_trait::async_trait]
impl Stage for FailOnContentStage {
    async fn process(&self, record: Record) -> Result<Vec<Record>, StageError> {
        if record.content == self.needle {
            return Err(StageError::failed(format!(
                "refusing designated content '{}'",
                self.needle
            )));
        }
        Ok(vec![record.pass(&self.next_tag)])
    }

    fn name(&self) -> &'static str {
        "fail_on_content"
    }

    fn kind(&self) -> StageKind {
        StageKind::Transform
    }

    fn declared_routes(&self) -> Vec<String> {
        vec![self.next_tag.clone()]
    }
}
