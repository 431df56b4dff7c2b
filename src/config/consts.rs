// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in defaults for engine and observability configuration.

/// Batch iterations a drain may run before it is declared divergent.
pub const DEFAULT_MAX_ITERATIONS: u64 = 10_000;

/// Recent trace entries retained for the dashboard.
pub const DEFAULT_TRACE_CAPACITY: usize = 256;

/// Recent error entries retained for the dashboard.
pub const DEFAULT_ERROR_CAPACITY: usize = 64;

/// Tag the CLI seeds input lines under.
pub const DEFAULT_INGRESS_TAG: &str = "start";
