// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and engine telemetry.
//!
//! Two halves live here:
//!
//! * [`store`] - the shared metrics/trace/error store the engine writes and
//!   the dashboard reads
//! * [`messages`] - centralized message types for diagnostic logging,
//!   struct-based with `Display` implementations to keep magic strings out of
//!   the codebase and structured fields on every emission

pub mod messages;
pub mod store;

pub use store::{ErrorEntry, ObservabilityStore, StageMetrics, TraceEntry};
