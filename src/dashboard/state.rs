// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::IndexMap;
use serde::Serialize;
use std::sync::{Arc, Mutex, RwLock};

use crate::observability::ObservabilityStore;

/// Shared state behind the dashboard routes.
///
/// The store is attached once the engine has been constructed; until then the
/// snapshot routes answer 503. Injection keeps the dashboard free of any
/// process-global engine reference.
pub struct DashboardState {
    store: RwLock<Option<Arc<ObservabilityStore>>>,
    ingest: IngestProgress,
}

impl DashboardState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            store: RwLock::new(None),
            ingest: IngestProgress::new(),
        })
    }

    /// Hand the dashboard its store handle. Called by the process entry
    /// point after the engine is built.
    pub fn attach_store(&self, store: Arc<ObservabilityStore>) {
        *self.store.write().expect("dashboard state poisoned") = Some(store);
    }

    pub fn store(&self) -> Option<Arc<ObservabilityStore>> {
        self.store
            .read()
            .expect("dashboard state poisoned")
            .clone()
    }

    pub fn ingest(&self) -> &IngestProgress {
        &self.ingest
    }
}

/// Lifecycle of one input file through ingestion.
#[derive(Debug, Clone, PartialEq)]
enum FileState {
    Pending,
    Processing,
    Done { lines: u64 },
}

/// Ingestion progress for file-driven ingress.
///
/// The CLI marks each input file as it moves through pending → processing →
/// done; the dashboard serves the summary read-only.
pub struct IngestProgress {
    files: Mutex<IndexMap<String, FileState>>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FileStateBody {
    pub path: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<u64>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FileStateSummary {
    pub seen: usize,
    pub processing: usize,
    pub done: usize,
    pub files: Vec<FileStateBody>,
}

impl IngestProgress {
    fn new() -> Self {
        Self {
            files: Mutex::new(IndexMap::new()),
        }
    }

    pub fn mark_pending(&self, path: impl Into<String>) {
        self.files
            .lock()
            .expect("ingest progress poisoned")
            .insert(path.into(), FileState::Pending);
    }

    pub fn mark_processing(&self, path: impl Into<String>) {
        self.files
            .lock()
            .expect("ingest progress poisoned")
            .insert(path.into(), FileState::Processing);
    }

    pub fn mark_done(&self, path: impl Into<String>, lines: u64) {
        self.files
            .lock()
            .expect("ingest progress poisoned")
            .insert(path.into(), FileState::Done { lines });
    }

    pub fn snapshot(&self) -> FileStateSummary {
        let files = self.files.lock().expect("ingest progress poisoned");
        let mut processing = 0;
        let mut done = 0;
        let bodies = files
            .iter()
            .map(|(path, state)| {
                let (label, lines) = match state {
                    FileState::Pending => ("pending", None),
                    FileState::Processing => {
                        processing += 1;
                        ("processing", None)
                    }
                    FileState::Done { lines } => {
                        done += 1;
                        ("done", Some(*lines))
                    }
                };
                FileStateBody {
                    path: path.clone(),
                    state: label.to_string(),
                    lines,
                }
            })
            .collect::<Vec<_>>();

        FileStateSummary {
            seen: files.len(),
            processing,
            done,
            files: bodies,
        }
    }
}
