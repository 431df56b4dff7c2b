use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::StageError;
use crate::record::Record;

/// Behavioral category of a stage.
///
/// Advisory rather than type-enforced, but used by validation and by the
/// engine's sink check: a `Sink` stage must emit nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Source,
    Filter,
    Transform,
    Sink,
}

/// A pluggable processing unit bound to one tag.
///
/// The engine guarantees every record handed to `process` currently points at
/// this stage's tag. Processing is per-record so one failing record degrades
/// to an error entry instead of aborting the rest of its batch.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Consume one record and emit zero or more successors.
    ///
    /// Emitted records may target any registered tag, including this stage's
    /// own tag (retry loops are legal). Sink stages return an empty Vec;
    /// that is how a record's journey ends.
    async fn process(&self, record: Record) -> Result<Vec<Record>, StageError>;

    fn name(&self) -> &'static str;

    fn kind(&self) -> StageKind;

    /// Output tags this stage is statically known to emit to.
    ///
    /// Used by startup validation to fail fast on routes with no registered
    /// stage. Stages whose targets only become known from data return an
    /// empty list; records they route to an unregistered tag degrade to
    /// runtime error entries instead.
    fn declared_routes(&self) -> Vec<String> {
        Vec::new()
    }
}
