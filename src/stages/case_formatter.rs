use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::StageError;
use crate::record::Record;
use crate::traits::{Stage, StageKind};

/// Case conversion applied by the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaseMode {
    Upper,
    Lower,
    Snake,
    /// Pass content through unchanged.
    #[default]
    #[serde(rename = "none")]
    Preserve,
}

/// Configuration for the Case Formatter stage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaseFormatterConfig {
    #[serde(default)]
    pub mode: CaseMode,
    /// Tag formatted records are routed to.
    pub next_tag: String,
}

/// Case Formatter stage - converts record content between cases
pub struct CaseFormatterStage {
    config: CaseFormatterConfig,
}

impl CaseFormatterStage {
    pub fn new(config: CaseFormatterConfig) -> Self {
        Self { config }
    }

    pub fn upper(next_tag: impl Into<String>) -> Self {
        Self::new(CaseFormatterConfig {
            mode: CaseMode::Upper,
            next_tag: next_tag.into(),
        })
    }

    pub fn snake(next_tag: impl Into<String>) -> Self {
        Self::new(CaseFormatterConfig {
            mode: CaseMode::Snake,
            next_tag: next_tag.into(),
        })
    }

    pub fn passthrough(next_tag: impl Into<String>) -> Self {
        Self::new(CaseFormatterConfig {
            mode: CaseMode::Preserve,
            next_tag: next_tag.into(),
        })
    }
}

/// Convert to snake_case: word boundaries at lower-to-upper transitions and
/// whitespace. Runs of uppercase collapse without extra separators, so
/// "ERROR" stays "error" rather than "e_r_r_o_r".
fn to_snake_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len() + 4);
    let mut prev: Option<char> = None;

    for ch in input.chars() {
        if ch.is_whitespace() {
            if !matches!(prev, Some('_') | None) {
                result.push('_');
            }
            prev = Some('_');
            continue;
        }

        if ch.is_uppercase() {
            let boundary = matches!(prev, Some(p) if p.is_lowercase() || p.is_ascii_digit());
            if boundary {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
        prev = Some(ch);
    }

    result
}

#[async_trait]
impl Stage for CaseFormatterStage {
    async fn process(&self, record: Record) -> Result<Vec<Record>, StageError> {
        let formatted = match self.config.mode {
            CaseMode::Upper => record.content.to_uppercase(),
            CaseMode::Lower => record.content.to_lowercase(),
            CaseMode::Snake => to_snake_case(&record.content),
            CaseMode::Preserve => record.content.clone(),
        };

        Ok(vec![record.forward(&self.config.next_tag, formatted)])
    }

    fn name(&self) -> &'static str {
        "case_formatter"
    }

    fn kind(&self) -> StageKind {
        StageKind::Transform
    }

    fn declared_routes(&self) -> Vec<String> {
        vec![self.config.next_tag.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn converts_between_cases() {
        let test_cases = vec![
            (CaseMode::Upper, "hello world", "HELLO WORLD"),
            (CaseMode::Lower, "HELLO World", "hello world"),
            (CaseMode::Snake, "CamelCaseLine", "camel_case_line"),
            (CaseMode::Preserve, "ERROR: disk full", "ERROR: disk full"),
        ];

        for (mode, input, expected) in test_cases {
            let stage = CaseFormatterStage::new(CaseFormatterConfig {
                mode,
                next_tag: "end".to_string(),
            });
            let emitted = stage.process(Record::new("general", input)).await.unwrap();
            assert_eq!(emitted.len(), 1);
            assert_eq!(emitted[0].content, expected, "mode {:?}", mode);
            assert_eq!(emitted[0].tag, "end");
        }
    }

    #[test]
    fn snake_case_handles_boundaries() {
        assert_eq!(to_snake_case("CamelCaseLine"), "camel_case_line");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("ERROR CODE"), "error_code");
        assert_eq!(to_snake_case("mixedUPPERCase"), "mixed_uppercase");
        assert_eq!(to_snake_case(""), "");
    }
}
