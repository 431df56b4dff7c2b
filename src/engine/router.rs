//! Tag-routed work queue engine driving stage graphs to a fixed point.
//!
//! This module implements the routing core: a set of per-tag FIFO queues, a
//! registry of stages, and a drain loop that repeatedly hands each stage the
//! entire current contents of its queue and redistributes whatever the stage
//! emits. The loop ends when no queue holds a record (the fixed point) or
//! when the configured iteration bound declares the graph divergent.
//!
//! # Scheduling Policy
//!
//! The policy is deterministic and documented so traces are reproducible for
//! the same input and stage logic:
//!
//! 1. **Queue selection**: the first non-empty queue in first-seen tag order
//!    (the order tags were first enqueued to, tracked by an insertion-ordered
//!    map).
//! 2. **Batch boundary**: the *entire current contents* of the selected queue
//!    are dequeued as one batch. Records produced while the batch runs go to
//!    the back of their destination queues, never into the running batch, so
//!    no tag can starve the others.
//! 3. **Per-record isolation**: the stage is invoked once per record. A
//!    failing record degrades to an error entry and is dropped; the rest of
//!    its batch proceeds.
//!
//! # Trace Accounting
//!
//! Record ownership transfers atomically: dequeue from the source queue,
//! stamp the destination tag onto the trace, enqueue at the destination. A
//! record sitting in a queue therefore always satisfies
//! `trace.last() == Some(&tag)`, and its trace grows by exactly one per hop.
//! Trace entries are recorded at each emission's enqueue; seeding does not
//! produce a trace entry.
//!
//! # Concurrency
//!
//! The drain loop runs to completion on one logical task: no two stages
//! execute concurrently and no record is visible on two queues at once. The
//! only concurrently-accessed structure is the observability store, which the
//! dashboard polls mid-drain through its own internal lock. An external
//! cancellation signal is checked once per batch iteration; an early stop
//! leaves the remaining queues populated and resumable.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use tagflow::config::StageRegistry;
//! use tagflow::engine::{Router, RouterOptions};
//! use tagflow::observability::ObservabilityStore;
//! use tagflow::stages::{ContentFilterConfig, ContentFilterStage, TerminalSinkStage};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = StageRegistry::new();
//! registry.register("error", Arc::new(ContentFilterStage::new(ContentFilterConfig {
//!     keyword: "ERROR".to_string(),
//!     next_tag: "end".to_string(),
//! })))?;
//! registry.register("end", Arc::new(TerminalSinkStage::new()))?;
//!
//! let store = Arc::new(ObservabilityStore::new(64, 64));
//! let mut router = Router::new(registry, store.clone(), RouterOptions::default());
//!
//! router.add_line("error", "ERROR: disk full");
//! router.add_line("error", "all quiet");
//!
//! let summary = router.process_queue().await?;
//! assert!(!summary.cancelled);
//! assert_eq!(router.pending(), 0);
//!
//! // One record survived the filter and reached the sink.
//! assert_eq!(store.snapshot_metrics().get("end").unwrap().processed, 1);
//! # Ok(())
//! # }
//! ```

use indexmap::IndexMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::consts::DEFAULT_MAX_ITERATIONS;
use crate::config::StageRegistry;
use crate::errors::EngineError;
use crate::observability::messages::engine::{
    DrainCancelled, DrainCompleted, DrainStarted, RoutingDiverged,
};
use crate::observability::messages::stage::{
    SinkEmissionDiscarded, StageRecordFailed, UnknownTagEncountered,
};
use crate::observability::messages::StructuredLog;
use crate::observability::{ErrorEntry, ObservabilityStore, TraceEntry};
use crate::record::Record;
use crate::traits::StageKind;

/// Engine options independent of the stage graph.
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    /// Batch iterations one drain may run before it is declared divergent.
    /// 0 disables the bound.
    pub max_iterations: u64,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Outcome of one `process_queue` drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainSummary {
    /// Stage batches executed.
    pub batches: u64,
    /// Records handed to stages, successful or not.
    pub processed: u64,
    /// Records emitted by stages and re-enqueued.
    pub emitted: u64,
    /// True when the drain stopped on the cancellation signal with work
    /// still queued; a later `process_queue` call resumes it.
    pub cancelled: bool,
}

/// The tag-routing engine.
///
/// Owns the stage registry and the per-tag queues; shares the observability
/// store with read-only consumers. Construct one per pipeline run, seed it
/// with [`Router::add_line`], then drive it with [`Router::process_queue`].
pub struct Router {
    registry: StageRegistry,
    store: Arc<ObservabilityStore>,
    /// Per-tag FIFO queues in first-seen order. Queues are created lazily on
    /// first reference and pruned once a drain reaches its fixed point, so
    /// independent runs rebuild selection order from scratch.
    queues: IndexMap<String, VecDeque<Record>>,
    cancel: CancellationToken,
    max_iterations: u64,
}

impl Router {
    pub fn new(
        registry: StageRegistry,
        store: Arc<ObservabilityStore>,
        options: RouterOptions,
    ) -> Self {
        Self {
            registry,
            store,
            queues: IndexMap::new(),
            cancel: CancellationToken::new(),
            max_iterations: options.max_iterations,
        }
    }

    /// Token external callers cancel to stop the current drain early.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Install a fresh cancellation token, making a cancelled router
    /// drainable again. Returns the new token.
    pub fn reset_cancellation(&mut self) -> CancellationToken {
        self.cancel = CancellationToken::new();
        self.cancel.clone()
    }

    /// Seed one line of content under a tag.
    pub fn add_line(&mut self, tag: impl Into<String>, content: impl Into<String>) {
        self.add_record(Record::new(tag, content));
    }

    /// Seed a pre-built record (carrying origin provenance).
    pub fn add_record(&mut self, record: Record) {
        self.enqueue(record);
    }

    /// Records currently waiting across all queues.
    pub fn pending(&self) -> usize {
        self.queues.values().map(|q| q.len()).sum()
    }

    /// Transfer ownership of a record into its tag's queue, stamping the tag
    /// onto the trace. The single place queue membership and traces change.
    fn enqueue(&mut self, mut record: Record) {
        record.trace.push(record.tag.clone());
        self.queues
            .entry(record.tag.clone())
            .or_default()
            .push_back(record);
    }

    /// Drive the stage graph to a fixed point.
    ///
    /// Blocking in the async sense: returns once no queue holds a record,
    /// the cancellation token fires, or the iteration bound is exceeded.
    /// Callable repeatedly; with nothing queued it returns immediately
    /// without touching metrics or traces.
    pub async fn process_queue(&mut self) -> Result<DrainSummary, EngineError> {
        let drain_start = Instant::now();
        DrainStarted {
            pending_records: self.pending(),
            stage_count: self.registry.len(),
        }
        .log();

        let mut batches = 0u64;
        let mut processed = 0u64;
        let mut emitted_total = 0u64;

        loop {
            if self.cancel.is_cancelled() {
                DrainCancelled {
                    batches,
                    remaining_records: self.pending(),
                }
                .log();
                return Ok(DrainSummary {
                    batches,
                    processed,
                    emitted: emitted_total,
                    cancelled: true,
                });
            }

            // First non-empty queue in first-seen tag order.
            let Some(tag) = self
                .queues
                .iter()
                .find(|(_, queue)| !queue.is_empty())
                .map(|(tag, _)| tag.clone())
            else {
                break; // fixed point
            };

            if self.max_iterations != 0 && batches >= self.max_iterations {
                RoutingDiverged {
                    iterations: self.max_iterations,
                }
                .log();
                return Err(EngineError::RoutingDivergence {
                    iterations: self.max_iterations,
                });
            }
            batches += 1;

            // The entire current queue contents become one batch; anything
            // enqueued while it runs waits for a later iteration.
            let batch = std::mem::take(
                self.queues
                    .get_mut(&tag)
                    .expect("selected queue must exist"),
            );
            let batch_len = batch.len() as u64;

            let Some(stage) = self.registry.resolve(&tag).cloned() else {
                // Tag only known from data and nothing is registered for it:
                // degrade each record to an error entry and keep draining.
                UnknownTagEncountered {
                    tag: &tag,
                    record_count: batch.len(),
                }
                .log();
                for record in &batch {
                    self.store.record_error(ErrorEntry::now(
                        &tag,
                        &record.content,
                        format!("No stage registered for tag '{}'", tag),
                    ));
                }
                self.store.record_routing_errors(&tag, batch_len);
                continue;
            };

            let stage_started = Instant::now();
            let mut emissions: Vec<Record> = Vec::new();
            let mut errors = 0u64;

            for record in batch {
                let snapshot = record.content.clone();
                match stage.process(record).await {
                    Ok(outs) => {
                        if stage.kind() == StageKind::Sink && !outs.is_empty() {
                            SinkEmissionDiscarded {
                                stage: &tag,
                                emitted: outs.len(),
                            }
                            .log();
                            self.store.record_error(ErrorEntry::now(
                                &tag,
                                &snapshot,
                                "sink stage emitted records; emissions discarded",
                            ));
                            errors += 1;
                        } else {
                            emissions.extend(outs);
                        }
                    }
                    Err(e) => {
                        StageRecordFailed {
                            stage: &tag,
                            error: &e,
                        }
                        .log();
                        self.store
                            .record_error(ErrorEntry::now(&tag, &snapshot, e.to_string()));
                        errors += 1;
                    }
                }
            }

            let elapsed = stage_started.elapsed();
            self.store.record_batch(&tag, batch_len, errors, elapsed);
            processed += batch_len;

            for record in emissions {
                let content = record.content.clone();
                let tag_path = {
                    let mut path = record.trace.clone();
                    path.push(record.tag.clone());
                    path
                };
                self.store.record_trace(TraceEntry::now(tag_path, content));
                self.enqueue(record);
                emitted_total += 1;
            }
        }

        // Fixed point reached: every queue is empty. Drop them so the next
        // independent drain rebuilds first-seen order from its own seeds.
        self.queues.retain(|_, queue| !queue.is_empty());

        DrainCompleted {
            batches,
            processed,
            duration: drain_start.elapsed(),
        }
        .log();

        Ok(DrainSummary {
            batches,
            processed,
            emitted: emitted_total,
            cancelled: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StageError;
    use crate::stages::StubStage;
    use crate::traits::Stage;
    use std::sync::Mutex;

    fn test_store() -> Arc<ObservabilityStore> {
        Arc::new(ObservabilityStore::new(64, 64))
    }

    /// Sink collecting contents for assertions.
    struct CollectingSink {
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Stage for CollectingSink {
        async fn process(&self, record: Record) -> Result<Vec<Record>, StageError> {
            self.seen.lock().unwrap().push(record.content);
            Ok(Vec::new())
        }

        fn name(&self) -> &'static str {
            "collecting_sink"
        }

        fn kind(&self) -> StageKind {
            StageKind::Sink
        }
    }

    /// Stage that re-emits every record to its own tag, forever.
    struct LoopingStage;

    #[async_trait::async_trait]
    impl Stage for LoopingStage {
        async fn process(&self, record: Record) -> Result<Vec<Record>, StageError> {
            let tag = record.tag.clone();
            Ok(vec![record.pass(tag)])
        }

        fn name(&self) -> &'static str {
            "looping"
        }

        fn kind(&self) -> StageKind {
            StageKind::Transform
        }
    }

    /// Sink that violates the emit-nothing contract.
    struct MisbehavingSink;

    #[async_trait::async_trait]
    impl Stage for MisbehavingSink {
        async fn process(&self, record: Record) -> Result<Vec<Record>, StageError> {
            Ok(vec![record.pass("end")])
        }

        fn name(&self) -> &'static str {
            "misbehaving_sink"
        }

        fn kind(&self) -> StageKind {
            StageKind::Sink
        }
    }

    #[tokio::test]
    async fn test_unknown_runtime_tag_degrades_to_error_entries() {
        let store = test_store();
        let mut registry = StageRegistry::new();
        registry
            .register("start", Arc::new(StubStage::forwarding("nowhere")))
            .unwrap();
        // "nowhere" is intentionally unregistered; it only becomes known
        // when the stub's emission arrives.
        let mut router = Router::new(registry, store.clone(), RouterOptions::default());

        router.add_line("start", "one");
        router.add_line("start", "two");

        let summary = router.process_queue().await.unwrap();
        assert!(!summary.cancelled);
        assert_eq!(router.pending(), 0);

        let errors = store.snapshot_errors(10);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.stage == "nowhere"));

        let metrics = store.snapshot_metrics();
        assert_eq!(metrics.get("nowhere").unwrap().errors, 2);
        assert_eq!(metrics.get("start").unwrap().processed, 2);
    }

    #[tokio::test]
    async fn test_divergent_graph_hits_iteration_bound() {
        let store = test_store();
        let mut registry = StageRegistry::new();
        registry.register("spin", Arc::new(LoopingStage)).unwrap();
        let mut router = Router::new(
            registry,
            store,
            RouterOptions { max_iterations: 5 },
        );

        router.add_line("spin", "round and round");

        let result = router.process_queue().await;
        assert_eq!(
            result,
            Err(EngineError::RoutingDivergence { iterations: 5 })
        );
        // The looping record is still queued for inspection.
        assert_eq!(router.pending(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_leaves_queues_resumable() {
        let store = test_store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = StageRegistry::new();
        registry
            .register("end", Arc::new(CollectingSink { seen: seen.clone() }))
            .unwrap();
        let mut router = Router::new(registry, store, RouterOptions::default());

        router.add_line("end", "held back");
        router.cancellation_token().cancel();

        let summary = router.process_queue().await.unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.batches, 0);
        assert_eq!(router.pending(), 1);
        assert!(seen.lock().unwrap().is_empty());

        // A fresh token makes the queued work drainable again.
        router.reset_cancellation();
        let summary = router.process_queue().await.unwrap();
        assert!(!summary.cancelled);
        assert_eq!(router.pending(), 0);
        assert_eq!(*seen.lock().unwrap(), vec!["held back"]);
    }

    #[tokio::test]
    async fn test_sink_emissions_are_discarded_and_counted() {
        let store = test_store();
        let mut registry = StageRegistry::new();
        registry.register("end", Arc::new(MisbehavingSink)).unwrap();
        let mut router = Router::new(registry, store.clone(), RouterOptions::default());

        router.add_line("end", "should stop here");

        let summary = router.process_queue().await.unwrap();
        assert_eq!(summary.emitted, 0);
        assert_eq!(router.pending(), 0);

        let metrics = store.snapshot_metrics();
        assert_eq!(metrics.get("end").unwrap().errors, 1);
        let errors = store.snapshot_errors(10);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].error.contains("sink stage emitted"));
    }

    #[tokio::test]
    async fn test_batch_boundary_keeps_new_arrivals_out_of_running_batch() {
        // One looping hop: a -> a is the same tag, so the emission must land
        // in a *new* batch, giving exactly two batches for two hops with a
        // bound of 2.
        struct OneHop {
            hops: Arc<Mutex<u32>>,
        }

        #[async_trait::async_trait]
        impl Stage for OneHop {
            async fn process(&self, record: Record) -> Result<Vec<Record>, StageError> {
                let mut hops = self.hops.lock().unwrap();
                if *hops == 0 {
                    *hops += 1;
                    let tag = record.tag.clone();
                    Ok(vec![record.pass(tag)])
                } else {
                    Ok(Vec::new())
                }
            }

            fn name(&self) -> &'static str {
                "one_hop"
            }

            fn kind(&self) -> StageKind {
                StageKind::Transform
            }
        }

        let store = test_store();
        let mut registry = StageRegistry::new();
        registry
            .register(
                "a",
                Arc::new(OneHop {
                    hops: Arc::new(Mutex::new(0)),
                }),
            )
            .unwrap();
        let mut router = Router::new(registry, store, RouterOptions { max_iterations: 3 });

        router.add_line("a", "bounce once");

        let summary = router.process_queue().await.unwrap();
        assert_eq!(summary.batches, 2);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.emitted, 1);
    }

    #[tokio::test]
    async fn test_queue_selection_is_first_seen_order() {
        let store = test_store();
        let order = Arc::new(Mutex::new(Vec::new()));

        struct OrderProbe {
            label: &'static str,
            order: Arc<Mutex<Vec<&'static str>>>,
        }

        #[async_trait::async_trait]
        impl Stage for OrderProbe {
            async fn process(&self, _record: Record) -> Result<Vec<Record>, StageError> {
                self.order.lock().unwrap().push(self.label);
                Ok(Vec::new())
            }

            fn name(&self) -> &'static str {
                "order_probe"
            }

            fn kind(&self) -> StageKind {
                StageKind::Sink
            }
        }

        let mut registry = StageRegistry::new();
        for label in ["beta", "alpha"] {
            registry
                .register(
                    label,
                    Arc::new(OrderProbe {
                        label,
                        order: order.clone(),
                    }),
                )
                .unwrap();
        }
        let mut router = Router::new(registry, store, RouterOptions::default());

        // Seed "beta" first; first-seen order wins over lexicographic.
        router.add_line("beta", "b");
        router.add_line("alpha", "a");

        router.process_queue().await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["beta", "alpha"]);
    }
}
