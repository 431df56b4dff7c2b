// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod registry;
mod runtime;
mod validation;

pub mod consts;

pub use loader::{
    load_and_validate_config, load_config, Config, ObservabilityConfig, StageConfig,
};
pub use registry::StageRegistry;
pub use runtime::RuntimeBuilder;
pub use validation::{validate_registry, validate_stage_graph};
