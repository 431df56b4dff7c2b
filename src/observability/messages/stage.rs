// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for per-stage processing events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// One record failed inside a stage and was dropped.
///
/// # Log Level
/// `warn!` - Recovered locally, drain continues
pub struct StageRecordFailed<'a> {
    pub stage: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for StageRecordFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stage '{}' failed on a record: {}", self.stage, self.error)
    }
}

impl StructuredLog for StageRecordFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            stage = self.stage,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "stage_record_failed",
            span_name = name,
            stage = self.stage,
            error = %self.error,
        )
    }
}

/// Records arrived for a tag with no registered stage.
///
/// # Log Level
/// `warn!` - Records degraded to error entries, drain continues
pub struct UnknownTagEncountered<'a> {
    pub tag: &'a str,
    pub record_count: usize,
}

impl Display for UnknownTagEncountered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} record(s) routed to tag '{}' which has no registered stage",
            self.record_count, self.tag
        )
    }
}

impl StructuredLog for UnknownTagEncountered<'_> {
    fn log(&self) {
        tracing::warn!(
            tag = self.tag,
            record_count = self.record_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "unknown_tag",
            span_name = name,
            tag = self.tag,
            record_count = self.record_count,
        )
    }
}

/// A sink stage emitted records; the emissions were discarded.
///
/// # Log Level
/// `warn!` - Contract violation, recorded as an error entry
pub struct SinkEmissionDiscarded<'a> {
    pub stage: &'a str,
    pub emitted: usize,
}

impl Display for SinkEmissionDiscarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Sink stage '{}' emitted {} record(s); sinks must emit nothing, emissions discarded",
            self.stage, self.emitted
        )
    }
}

impl StructuredLog for SinkEmissionDiscarded<'_> {
    fn log(&self) {
        tracing::warn!(
            stage = self.stage,
            emitted = self.emitted,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "sink_emission_discarded",
            span_name = name,
            stage = self.stage,
            emitted = self.emitted,
        )
    }
}
