// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Shared store for per-stage metrics, recent traces, and recent errors.
//!
//! The routing loop is the single writer; the dashboard polls snapshots from
//! other tasks while a drain is still in flight. One `std::sync::Mutex`
//! guards all state: every append and every snapshot takes the lock for a
//! short, non-async critical section, so a concurrent reader never observes a
//! half-written entry and never parks the drain loop on an await point.
//!
//! Traces and errors live in fixed-capacity rings (oldest evicted first),
//! matching the "recent N" access pattern the dashboard needs. Metrics are
//! unbounded-lifetime counters, one set per stage tag, never reset during a
//! run.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// Monotonic counters for one stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageMetrics {
    /// Records handed to the stage, successful or not.
    pub processed: u64,
    /// Records that failed inside the stage (or could not be routed to it).
    pub errors: u64,
    /// Total wall time spent inside the stage's process calls.
    pub elapsed: Duration,
}

/// Snapshot of one record's hop, taken when the engine enqueues an emission.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    /// Tags the record has been enqueued under, destination last.
    pub tag_path: Vec<String>,
    /// Content snapshot at the time of the hop.
    pub content: String,
    pub timestamp: SystemTime,
}

/// One recovered per-record failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEntry {
    /// Tag of the stage that failed (or the unresolvable tag itself).
    pub stage: String,
    /// Content snapshot of the offending record.
    pub content: String,
    /// Human-readable failure description.
    pub error: String,
    pub timestamp: SystemTime,
}

struct StoreInner {
    metrics: HashMap<String, StageMetrics>,
    traces: VecDeque<TraceEntry>,
    errors: VecDeque<ErrorEntry>,
}

/// Thread-safe observability store shared between the engine and dashboard.
pub struct ObservabilityStore {
    inner: Mutex<StoreInner>,
    trace_capacity: usize,
    error_capacity: usize,
}

impl ObservabilityStore {
    pub fn new(trace_capacity: usize, error_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                metrics: HashMap::new(),
                traces: VecDeque::with_capacity(trace_capacity),
                errors: VecDeque::with_capacity(error_capacity),
            }),
            trace_capacity: trace_capacity.max(1),
            error_capacity: error_capacity.max(1),
        }
    }

    /// Fold one stage batch into the stage's counters.
    pub fn record_batch(&self, stage: &str, processed: u64, errors: u64, elapsed: Duration) {
        let mut inner = self.inner.lock().expect("observability store poisoned");
        let metrics = inner.metrics.entry(stage.to_string()).or_default();
        metrics.processed += processed;
        metrics.errors += errors;
        metrics.elapsed += elapsed;
    }

    /// Count failures against a stage without a timed batch (e.g. records
    /// routed to a tag with no registered stage).
    pub fn record_routing_errors(&self, stage: &str, errors: u64) {
        self.record_batch(stage, 0, errors, Duration::ZERO);
    }

    pub fn record_trace(&self, entry: TraceEntry) {
        let mut inner = self.inner.lock().expect("observability store poisoned");
        if inner.traces.len() == self.trace_capacity {
            inner.traces.pop_front();
        }
        inner.traces.push_back(entry);
    }

    pub fn record_error(&self, entry: ErrorEntry) {
        let mut inner = self.inner.lock().expect("observability store poisoned");
        if inner.errors.len() == self.error_capacity {
            inner.errors.pop_front();
        }
        inner.errors.push_back(entry);
    }

    /// Current counters for every stage seen so far.
    pub fn snapshot_metrics(&self) -> HashMap<String, StageMetrics> {
        let inner = self.inner.lock().expect("observability store poisoned");
        inner.metrics.clone()
    }

    /// Up to `limit` recent traces, most recent first.
    pub fn snapshot_traces(&self, limit: usize) -> Vec<TraceEntry> {
        let inner = self.inner.lock().expect("observability store poisoned");
        inner.traces.iter().rev().take(limit).cloned().collect()
    }

    /// Up to `limit` recent errors, most recent first.
    pub fn snapshot_errors(&self, limit: usize) -> Vec<ErrorEntry> {
        let inner = self.inner.lock().expect("observability store poisoned");
        inner.errors.iter().rev().take(limit).cloned().collect()
    }

    /// Total error count across all stages.
    pub fn total_errors(&self) -> u64 {
        let inner = self.inner.lock().expect("observability store poisoned");
        inner.metrics.values().map(|m| m.errors).sum()
    }
}

impl TraceEntry {
    pub fn now(tag_path: Vec<String>, content: String) -> Self {
        Self {
            tag_path,
            content,
            timestamp: SystemTime::now(),
        }
    }
}

impl ErrorEntry {
    pub fn now(stage: impl Into<String>, content: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            content: content.into(),
            error: error.into(),
            timestamp: SystemTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn metrics_accumulate_across_batches() {
        let store = ObservabilityStore::new(8, 8);
        store.record_batch("start", 3, 0, Duration::from_millis(5));
        store.record_batch("start", 2, 1, Duration::from_millis(7));

        let metrics = store.snapshot_metrics();
        let start = metrics.get("start").unwrap();
        assert_eq!(start.processed, 5);
        assert_eq!(start.errors, 1);
        assert_eq!(start.elapsed, Duration::from_millis(12));
    }

    #[test]
    fn trace_ring_evicts_oldest_first() {
        let store = ObservabilityStore::new(2, 2);
        store.record_trace(TraceEntry::now(vec!["a".into()], "one".into()));
        store.record_trace(TraceEntry::now(vec!["b".into()], "two".into()));
        store.record_trace(TraceEntry::now(vec!["c".into()], "three".into()));

        let traces = store.snapshot_traces(10);
        assert_eq!(traces.len(), 2);
        // Most recent first; "one" was evicted.
        assert_eq!(traces[0].content, "three");
        assert_eq!(traces[1].content, "two");
    }

    #[test]
    fn error_ring_respects_limit_argument() {
        let store = ObservabilityStore::new(8, 8);
        for i in 0..5 {
            store.record_error(ErrorEntry::now("general", format!("rec{}", i), "boom"));
        }

        let errors = store.snapshot_errors(3);
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].content, "rec4");
        assert_eq!(errors[2].content, "rec2");
    }

    #[test]
    fn snapshots_are_safe_under_concurrent_appends() {
        let store = Arc::new(ObservabilityStore::new(64, 64));
        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..500u64 {
                    store.record_batch("start", 1, 0, Duration::from_micros(1));
                    store.record_trace(TraceEntry::now(
                        vec!["start".into()],
                        format!("line{}", i),
                    ));
                }
            })
        };

        // Reader polls snapshots while the writer is appending; every
        // observed entry must be fully formed.
        for _ in 0..50 {
            for trace in store.snapshot_traces(16) {
                assert!(trace.content.starts_with("line"));
                assert_eq!(trace.tag_path, vec!["start".to_string()]);
            }
        }

        writer.join().unwrap();
        assert_eq!(store.snapshot_metrics().get("start").unwrap().processed, 500);
    }
}
