// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The unit of work flowing through the routing engine.
//!
//! A [`Record`] pairs an opaque content payload with the tag that names the
//! stage responsible for it next. The engine never inspects `content`; stages
//! own its interpretation. The `trace` field is diagnostic only: the engine
//! appends the destination tag each time a record is enqueued, so a record
//! sitting in a queue always satisfies `trace.last() == Some(&tag)` and the
//! trace grows by exactly one per hop.

use serde::Serialize;

/// One unit of work: content plus its current routing tag.
///
/// Records are exclusively owned by whichever queue currently holds them.
/// Stages receive a record, and return zero or more successor records built
/// with [`Record::forward`] or [`Record::pass`]; the successors inherit the
/// input's trace and origin, and the engine stamps the destination tag onto
/// the trace when it takes ownership.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Current routing key; names the stage registered to handle this record.
    pub tag: String,
    /// The payload being transformed. Opaque to the engine.
    pub content: String,
    /// Ordered tags this record has been enqueued under, current tag last.
    pub trace: Vec<String>,
    /// Optional provenance (e.g. source file path), carried unchanged.
    pub origin: Option<String>,
}

impl Record {
    /// A fresh record with an empty trace, ready to be seeded into the engine.
    pub fn new(tag: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            content: content.into(),
            trace: Vec::new(),
            origin: None,
        }
    }

    /// Attach provenance to a fresh record.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Build a successor record carrying new content toward `next_tag`.
    ///
    /// Trace and origin are inherited from `self`; the engine appends
    /// `next_tag` to the trace at enqueue time, not here.
    pub fn forward(&self, next_tag: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tag: next_tag.into(),
            content: content.into(),
            trace: self.trace.clone(),
            origin: self.origin.clone(),
        }
    }

    /// Build a successor record keeping the content unchanged.
    pub fn pass(&self, next_tag: impl Into<String>) -> Self {
        let content = self.content.clone();
        self.forward(next_tag, content)
    }
}
