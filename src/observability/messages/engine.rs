// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for drain lifecycle events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A drain started over the currently-seeded queues.
///
/// # Log Level
/// `info!` - Important operational event
pub struct DrainStarted {
    pub pending_records: usize,
    pub stage_count: usize,
}

impl Display for DrainStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting drain: {} pending records across {} registered stages",
            self.pending_records, self.stage_count
        )
    }
}

impl StructuredLog for DrainStarted {
    fn log(&self) {
        tracing::info!(
            pending_records = self.pending_records,
            stage_count = self.stage_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "drain",
            span_name = name,
            pending_records = self.pending_records,
            stage_count = self.stage_count,
        )
    }
}

/// A drain reached its fixed point.
///
/// # Log Level
/// `info!` - Important operational event
pub struct DrainCompleted {
    pub batches: u64,
    pub processed: u64,
    pub duration: std::time::Duration,
}

impl Display for DrainCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Drain completed: {} batches, {} records in {:?}",
            self.batches, self.processed, self.duration
        )
    }
}

impl StructuredLog for DrainCompleted {
    fn log(&self) {
        tracing::info!(
            batches = self.batches,
            processed = self.processed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "drain_completed",
            span_name = name,
            batches = self.batches,
            processed = self.processed,
            duration = ?self.duration,
        )
    }
}

/// A drain stopped early on an external cancellation signal.
///
/// # Log Level
/// `warn!` - Early termination, queues left populated
pub struct DrainCancelled {
    pub batches: u64,
    pub remaining_records: usize,
}

impl Display for DrainCancelled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Drain cancelled after {} batches with {} records still queued",
            self.batches, self.remaining_records
        )
    }
}

impl StructuredLog for DrainCancelled {
    fn log(&self) {
        tracing::warn!(
            batches = self.batches,
            remaining_records = self.remaining_records,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "drain_cancelled",
            span_name = name,
            batches = self.batches,
            remaining_records = self.remaining_records,
        )
    }
}

/// The drain exceeded its iteration bound without reaching a fixed point.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct RoutingDiverged {
    pub iterations: u64,
}

impl Display for RoutingDiverged {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Routing diverged: no fixed point after {} batch iterations",
            self.iterations
        )
    }
}

impl StructuredLog for RoutingDiverged {
    fn log(&self) {
        tracing::error!(iterations = self.iterations, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "routing_diverged",
            span_name = name,
            iterations = self.iterations,
        )
    }
}
