// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Read-only HTTP dashboard over the observability store.
//!
//! The dashboard is a consumer, never a mutator: it polls `snapshot_*` on the
//! injected store handle while the engine may still be draining. It holds no
//! reference to the engine itself - the store (and the CLI's file ingestion
//! progress) are handed in explicitly at startup.

pub mod server;
pub mod state;

pub use server::{router, serve};
pub use state::{DashboardState, IngestProgress};
