// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;        // config + registry
pub mod dashboard;     // read-only HTTP surface
pub mod engine;        // tag routing engine
pub mod errors;        // error handling
pub mod observability; // metrics, traces, structured logging
pub mod record;        // unit of work
pub mod stages;        // stage implementations
pub mod traits;        // unified abstractions
