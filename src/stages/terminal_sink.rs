use async_trait::async_trait;
use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::errors::StageError;
use crate::record::Record;
use crate::traits::{Stage, StageKind};

/// Where the sink writes finished records.
///
/// The target is injected at construction so the process entry point owns the
/// output lifecycle; tests capture lines in memory instead of stdout.
enum SinkTarget {
    Stdout,
    Buffer(Arc<Mutex<Vec<String>>>),
}

/// Terminal Sink stage - ends a record's journey by writing its content
///
/// Emits nothing; that is how the engine recognizes a finished record.
pub struct TerminalSinkStage {
    target: SinkTarget,
}

impl TerminalSinkStage {
    /// Sink writing to stdout, one line per record.
    pub fn new() -> Self {
        Self {
            target: SinkTarget::Stdout,
        }
    }

    /// Sink capturing lines into a shared buffer, for tests and demos.
    pub fn with_buffer(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            target: SinkTarget::Buffer(buffer),
        }
    }
}

impl Default for TerminalSinkStage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Stage for TerminalSinkStage {
    async fn process(&self, record: Record) -> Result<Vec<Record>, StageError> {
        match &self.target {
            SinkTarget::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                writeln!(handle, "{}", record.content)?;
            }
            SinkTarget::Buffer(buffer) => {
                buffer
                    .lock()
                    .map_err(|_| StageError::failed("sink buffer poisoned"))?
                    .push(record.content);
            }
        }
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "terminal_sink"
    }

    fn kind(&self) -> StageKind {
        StageKind::Sink
    }
}
