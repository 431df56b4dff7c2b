// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use thiserror::Error;

/// Errors that can occur during stage graph validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two stages were registered for the same tag
    ConflictingTag {
        /// The tag registered more than once
        tag: String,
    },
    /// A stage declares a route to a tag with no registered stage
    UnknownRouteTag {
        /// The stage tag declaring the route
        stage_tag: String,
        /// The route target that couldn't be resolved
        route_tag: String,
    },
    /// A sink stage declares outbound routes
    SinkWithRoutes {
        /// The offending sink tag
        stage_tag: String,
    },
    /// A stage implementation could not be constructed from its options
    StageCreationFailed {
        /// The tag whose stage failed to construct
        tag: String,
        /// Why construction failed
        reason: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ConflictingTag { tag } => {
                write!(f, "Tag '{}' is registered more than once", tag)
            }
            ValidationError::UnknownRouteTag {
                stage_tag,
                route_tag,
            } => {
                write!(
                    f,
                    "Stage '{}' routes to '{}' which has no registered stage",
                    stage_tag, route_tag
                )
            }
            ValidationError::SinkWithRoutes { stage_tag } => {
                write!(
                    f,
                    "Sink stage '{}' declares outbound routes but sinks must emit nothing",
                    stage_tag
                )
            }
            ValidationError::StageCreationFailed { tag, reason } => {
                write!(f, "Failed to create stage for tag '{}': {}", tag, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors surfaced while loading configuration at the CLI boundary.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid YAML for the expected shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Structural validation of the stage graph failed.
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
