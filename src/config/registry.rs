use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::ValidationError;
use crate::stages::StageFactory;
use crate::traits::Stage;

/// Newtype wrapper for the tag → stage registry providing type safety
///
/// The engine exclusively owns the registry; stages are resolved once per
/// batch through it. Registration rejects duplicate tags so configuration
/// conflicts surface at startup, never mid-drain.
#[derive(Clone)]
pub struct StageRegistry(HashMap<String, Arc<dyn Stage>>);

impl StageRegistry {
    /// Create a new empty stage registry
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Bind a tag to a stage implementation.
    ///
    /// Duplicate registration for the same tag is a configuration conflict.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        stage: Arc<dyn Stage>,
    ) -> Result<(), ValidationError> {
        let tag = tag.into();
        if self.0.contains_key(&tag) {
            return Err(ValidationError::ConflictingTag { tag });
        }
        self.0.insert(tag, stage);
        Ok(())
    }

    /// Resolve the stage registered for a tag
    pub fn resolve(&self, tag: &str) -> Option<&Arc<dyn Stage>> {
        self.0.get(tag)
    }

    /// Check if a tag has a registered stage
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.0.contains_key(tag)
    }

    /// Number of registered stages
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over (tag, stage) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<dyn Stage>)> {
        self.0.iter()
    }

    /// Build and validate a registry from configuration.
    ///
    /// Fails fast on stage creation errors, duplicate tags, and declared
    /// routes with no registered stage; records never flow through an
    /// invalid graph.
    pub fn from_config(cfg: &Config) -> Result<Self, Vec<ValidationError>> {
        let mut registry = StageRegistry::new();
        let mut errors = Vec::new();

        for stage_config in &cfg.stages {
            let stage = match StageFactory::create_stage(stage_config) {
                Ok(stage) => stage,
                Err(reason) => {
                    errors.push(ValidationError::StageCreationFailed {
                        tag: stage_config.tag.clone(),
                        reason,
                    });
                    continue;
                }
            };

            if let Err(e) = registry.register(&stage_config.tag, stage) {
                errors.push(e);
            }
        }

        // Route validation needs the full tag set, so it runs after every
        // stage has had its chance to register.
        if errors.is_empty() {
            if let Err(route_errors) = crate::config::validate_registry(&registry) {
                errors.extend(route_errors);
            }
        }

        if errors.is_empty() {
            Ok(registry)
        } else {
            Err(errors)
        }
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRegistry")
            .field("stage_count", &self.0.len())
            .field("tags", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageConfig;
    use crate::stages::StubStage;
    use crate::traits::StageKind;
    use std::collections::HashMap as StdHashMap;

    #[test]
    fn test_register_and_resolve() {
        let mut registry = StageRegistry::new();
        registry
            .register("end", Arc::new(StubStage::swallowing()))
            .unwrap();

        assert!(registry.contains_tag("end"));
        assert!(registry.resolve("end").is_some());
        assert!(registry.resolve("nope").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_is_a_conflict() {
        let mut registry = StageRegistry::new();
        registry
            .register("end", Arc::new(StubStage::swallowing()))
            .unwrap();

        let result = registry.register("end", Arc::new(StubStage::swallowing()));
        assert_eq!(
            result,
            Err(ValidationError::ConflictingTag {
                tag: "end".to_string()
            })
        );
        // First registration stays in place
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_from_config_table_driven() {
        struct TestCase {
            name: &'static str,
            stages: Vec<(&'static str, StageKind, &'static str, Vec<(&'static str, &'static str)>)>,
            expect_ok: bool,
            expected_tags: Vec<&'static str>,
        }

        let test_cases = vec![
            TestCase {
                name: "empty config",
                stages: vec![],
                expect_ok: true,
                expected_tags: vec![],
            },
            TestCase {
                name: "reference pipeline",
                stages: vec![
                    ("start", StageKind::Source, "tag_assigner", vec![]),
                    (
                        "error",
                        StageKind::Filter,
                        "content_filter",
                        vec![("keyword", "ERROR"), ("next_tag", "general")],
                    ),
                    (
                        "warn",
                        StageKind::Filter,
                        "content_filter",
                        vec![("keyword", "WARN"), ("next_tag", "general")],
                    ),
                    (
                        "general",
                        StageKind::Transform,
                        "case_formatter",
                        vec![("mode", "none"), ("next_tag", "end")],
                    ),
                    ("end", StageKind::Sink, "terminal_sink", vec![]),
                ],
                expect_ok: true,
                expected_tags: vec!["start", "error", "warn", "general", "end"],
            },
            TestCase {
                name: "unknown implementation",
                stages: vec![("start", StageKind::Source, "flux_capacitor", vec![])],
                expect_ok: false,
                expected_tags: vec![],
            },
            TestCase {
                name: "route to unregistered tag",
                stages: vec![(
                    "error",
                    StageKind::Filter,
                    "content_filter",
                    vec![("keyword", "ERROR"), ("next_tag", "missing")],
                )],
                expect_ok: false,
                expected_tags: vec![],
            },
        ];

        for test_case in test_cases {
            let config = Config {
                ingress_tag: "start".to_string(),
                max_iterations: 100,
                observability: Default::default(),
                stages: test_case
                    .stages
                    .iter()
                    .map(|(tag, kind, stage, options)| StageConfig {
                        tag: tag.to_string(),
                        kind: *kind,
                        stage: stage.to_string(),
                        options: options
                            .iter()
                            .map(|(k, v)| {
                                (k.to_string(), serde_yaml::Value::String(v.to_string()))
                            })
                            .collect::<StdHashMap<_, _>>(),
                    })
                    .collect(),
            };

            let result = StageRegistry::from_config(&config);
            assert_eq!(
                result.is_ok(),
                test_case.expect_ok,
                "test case '{}': unexpected result {:?}",
                test_case.name,
                result.as_ref().err()
            );

            if let Ok(registry) = result {
                assert_eq!(
                    registry.len(),
                    test_case.expected_tags.len(),
                    "test case '{}'",
                    test_case.name
                );
                for tag in &test_case.expected_tags {
                    assert!(
                        registry.contains_tag(tag),
                        "test case '{}': expected tag '{}' registered",
                        test_case.name,
                        tag
                    );
                }
            }
        }
    }
}
