// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Message types follow a struct-based pattern with `Display` implementations
//! plus the [`StructuredLog`] trait, so call sites emit both a readable line
//! and structured fields without scattering format strings through the
//! codebase.
//!
//! Messages are organized by subsystem:
//!
//! * `engine` - drain lifecycle events
//! * `stage` - per-stage processing events
//! * `validation` - configuration validation failures

use tracing::Span;

pub mod engine;
pub mod stage;
pub mod validation;

/// Emit a message through `tracing` with structured fields attached.
pub trait StructuredLog {
    /// Log the message at its intended level with structured fields.
    fn log(&self);

    /// Create a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
