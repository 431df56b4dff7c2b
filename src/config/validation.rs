//! Configuration validation for routing graph integrity.
//!
//! Validation happens in two layers because the information becomes available
//! in two steps:
//!
//! 1. **Config-level** ([`validate_stage_graph`]): every tag is registered at
//!    most once and the ingress tag has a stage. Checkable before any stage
//!    is constructed.
//! 2. **Registry-level** ([`validate_registry`]): every statically declared
//!    route points at a registered stage, and sink stages declare no routes.
//!    Requires constructed stages, since route targets live in each stage's
//!    typed options.
//!
//! Cycles are deliberately not rejected: a tag graph may legally loop (retry
//! stages re-emit to their own tag), so divergence is bounded at runtime by
//! the engine's iteration cap instead of a startup check.
//!
//! Both layers accumulate every error they find rather than stopping at the
//! first, so a bad configuration is fixable in one pass.

use std::collections::HashSet;

use crate::config::{Config, StageRegistry};
use crate::errors::ValidationError;
use crate::traits::StageKind;

/// Validates the statically checkable structure of a configuration.
///
/// # Arguments
///
/// * `config` - The configuration to validate
///
/// # Returns
///
/// * `Ok(())` - Configuration structure is valid
/// * `Err(Vec<ValidationError>)` - Every structural error found
pub fn validate_stage_graph(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen_tags = HashSet::new();
    for stage in &config.stages {
        if !seen_tags.insert(&stage.tag) {
            errors.push(ValidationError::ConflictingTag {
                tag: stage.tag.clone(),
            });
        }
    }

    // The ingress tag is statically known, so seeding it must resolve.
    if !seen_tags.contains(&config.ingress_tag) {
        errors.push(ValidationError::UnknownRouteTag {
            stage_tag: "ingress".to_string(),
            route_tag: config.ingress_tag.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a constructed registry's routing graph.
///
/// Every tag returned from a stage's `declared_routes` must resolve to a
/// registered stage; unresolvable declared routes would otherwise surface
/// only at runtime as dropped records. Sinks declaring routes violate the
/// emit-nothing contract and are rejected here as well.
///
/// Tags that only become known from data (policies with dynamic targets
/// return them from `declared_routes` as best they can; genuinely dynamic
/// ones cannot) degrade to per-record error entries at runtime instead.
pub fn validate_registry(registry: &StageRegistry) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (tag, stage) in registry.iter() {
        let routes = stage.declared_routes();

        if stage.kind() == StageKind::Sink && !routes.is_empty() {
            errors.push(ValidationError::SinkWithRoutes {
                stage_tag: tag.clone(),
            });
            continue;
        }

        for route in routes {
            if !registry.contains_tag(&route) {
                errors.push(ValidationError::UnknownRouteTag {
                    stage_tag: tag.clone(),
                    route_tag: route,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
