// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Failure while a stage processes one record.
///
/// Recovered at per-record granularity by the engine: the record is dropped,
/// an error entry is recorded, and the rest of the batch proceeds.
#[derive(Error, Debug)]
pub enum StageError {
    /// I/O failure in a stage's own side effect (e.g. a sink write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stage could not process this record.
    #[error("{0}")]
    Failed(String),
}

impl StageError {
    pub fn failed(message: impl Into<String>) -> Self {
        StageError::Failed(message.into())
    }
}
