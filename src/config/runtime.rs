// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{Config, StageRegistry};
use crate::engine::RouterOptions;
use crate::errors::ConfigError;
use crate::observability::messages::validation::ValidationFailed;
use crate::observability::messages::StructuredLog;

/// Runtime builder - orchestrates registry and engine option creation from
/// configuration.
///
/// Coordinates stage construction, registration, and graph validation so the
/// caller receives either a registry that is safe to route through or a
/// fail-fast configuration error, never a half-valid graph.
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the routing runtime from configuration.
    ///
    /// Creates and returns:
    /// - `StageRegistry`: validated tag → stage bindings
    /// - `RouterOptions`: engine options (iteration bound)
    ///
    /// # Arguments
    /// * `cfg` - Configuration containing stage definitions and engine options
    pub fn from_config(cfg: &Config) -> Result<(StageRegistry, RouterOptions), ConfigError> {
        let registry = StageRegistry::from_config(cfg).map_err(|errors| {
            ValidationFailed {
                error_count: errors.len(),
            }
            .log();
            ConfigError::Validation(errors)
        })?;

        let options = RouterOptions {
            max_iterations: cfg.max_iterations,
        };

        Ok((registry, options))
    }
}
