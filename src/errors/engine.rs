// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural errors surfaced by the routing engine.
//!
//! Anything local to one record's journey through one stage is recovered
//! inside the drain loop (error entry + counter); only structural failures
//! reach the caller of `process_queue` through this type.

use thiserror::Error;

/// Fatal routing engine failures.
#[derive(Error, Debug, PartialEq)]
pub enum EngineError {
    /// The drain exceeded its configured iteration bound without reaching a
    /// fixed point. Remaining queues are left intact for inspection.
    #[error("Routing diverged: no fixed point after {iterations} batch iterations")]
    RoutingDivergence { iterations: u64 },
}
