// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod case_formatter;
pub mod content_filter;
pub mod factory;
pub mod stub;
pub mod tag_assigner;
pub mod terminal_sink;

pub use case_formatter::{CaseFormatterConfig, CaseFormatterStage, CaseMode};
pub use content_filter::{ContentFilterConfig, ContentFilterStage};
pub use factory::StageFactory;
pub use stub::{FailOnContentStage, StubStage};
pub use tag_assigner::{KeywordPolicy, SequencePolicy, TagAssignerConfig, TagAssignerStage, TagPolicy};
pub use terminal_sink::TerminalSinkStage;
