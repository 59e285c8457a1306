//! Batch ranking pipeline
//!
//! One run walks `Idle → Loading → Scoring → Merging → Committing → Idle`,
//! with `Failed` reachable from any non-idle phase. Scoring fans out over a
//! deterministic stride partition of the pair space; merging and committing
//! are single-threaded. A run either commits the full relationship set or
//! leaves the store exactly as it was.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{PipelinePhase, RelatedItem, RunOutcome, SimilarityEdge};
use crate::store::{CatalogStore, RelatednessStore};

use super::combine;
use super::snapshot::AttributeSnapshot;
use super::topn::TopNAccumulator;

/// Outcome of the most recent run, kept for the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct LastRun {
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: RunOutcome,
}

/// Orchestrates batch runs of the similarity pipeline
///
/// Runs are single-flight: a second `run` while one is active is rejected
/// before any state changes. Cancellation is cooperative and never leaves
/// the store partially updated.
pub struct BatchRunner {
    catalog: Arc<dyn CatalogStore>,
    store: Arc<dyn RelatednessStore>,
    top_n: usize,
    workers: usize,
    running: AtomicBool,
    cancel: Arc<AtomicBool>,
    phase: tokio::sync::RwLock<PipelinePhase>,
    last_run: tokio::sync::RwLock<Option<LastRun>>,
}

impl BatchRunner {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        store: Arc<dyn RelatednessStore>,
        top_n: usize,
        workers: usize,
    ) -> Self {
        Self {
            catalog,
            store,
            top_n,
            workers: workers.max(1),
            running: AtomicBool::new(false),
            cancel: Arc::new(AtomicBool::new(false)),
            phase: tokio::sync::RwLock::new(PipelinePhase::Idle),
            last_run: tokio::sync::RwLock::new(None),
        }
    }

    pub async fn phase(&self) -> PipelinePhase {
        *self.phase.read().await
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub async fn last_run(&self) -> Option<LastRun> {
        self.last_run.read().await.clone()
    }

    /// Raises the cooperative cancellation flag for the active run
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Executes one batch run end to end
    ///
    /// Rejects the call with `ConcurrentRunRejected` if a run is already in
    /// progress; otherwise always returns an outcome, never an error — run
    /// failures are reported as `RunOutcome::Failed`.
    pub async fn run(&self) -> AppResult<RunOutcome> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(AppError::ConcurrentRunRejected);
        }
        self.cancel.store(false, Ordering::SeqCst);

        let started = Instant::now();
        let outcome = self.run_inner(started).await;

        let final_phase = if matches!(outcome, RunOutcome::Completed { .. }) {
            PipelinePhase::Idle
        } else {
            PipelinePhase::Failed
        };
        self.set_phase(final_phase).await;
        *self.last_run.write().await = Some(LastRun {
            finished_at: Utc::now(),
            outcome: outcome.clone(),
        });
        self.running.store(false, Ordering::SeqCst);

        Ok(outcome)
    }

    async fn run_inner(&self, started: Instant) -> RunOutcome {
        tracing::info!(top_n = self.top_n, workers = self.workers, "Batch run started");

        // Loading
        self.set_phase(PipelinePhase::Loading).await;
        let snapshot = match AttributeSnapshot::load(self.catalog.as_ref()).await {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                tracing::error!(error = %e, "Snapshot load failed, aborting run");
                return RunOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };
        if self.cancelled() {
            return self.cancelled_outcome();
        }

        // Scoring: fan out over stride shards of the i < j pair space
        self.set_phase(PipelinePhase::Scoring).await;
        let ids = Arc::new(snapshot.ids());
        let shard_count = self.workers.min(ids.len()).max(1);

        let mut handles = Vec::with_capacity(shard_count);
        for shard in 0..shard_count {
            let snapshot = Arc::clone(&snapshot);
            let ids = Arc::clone(&ids);
            let cancel = Arc::clone(&self.cancel);
            let top_n = self.top_n;
            handles.push(tokio::task::spawn_blocking(move || {
                score_shard(&snapshot, &ids, shard, shard_count, top_n, &cancel)
            }));
        }

        let mut shard_results = Vec::with_capacity(shard_count);
        let mut pairs_scored: u64 = 0;
        let mut shard_cancelled = false;
        for handle in handles {
            match handle.await {
                Ok(Some(result)) => {
                    pairs_scored += result.pairs;
                    shard_results.push(result.scores);
                }
                Ok(None) => shard_cancelled = true,
                Err(e) => {
                    tracing::error!(error = %e, "Scoring worker panicked");
                    return RunOutcome::Failed {
                        reason: format!("scoring worker failed: {e}"),
                    };
                }
            }
        }
        if shard_cancelled || self.cancelled() {
            return self.cancelled_outcome();
        }

        // Merging: fold private shard accumulators into final top-N lists
        self.set_phase(PipelinePhase::Merging).await;
        let mut merged = TopNAccumulator::new(self.top_n);
        for scores in shard_results {
            merged.merge(scores);
        }
        let edges = collect_edges(merged.into_lists());
        if self.cancelled() {
            return self.cancelled_outcome();
        }

        // Committing: one atomic replacement of the whole relationship set
        self.set_phase(PipelinePhase::Committing).await;
        if let Err(e) = self.store.replace_all(&edges).await {
            tracing::error!(error = %e, "Commit failed, previous data untouched");
            return RunOutcome::Failed {
                reason: format!("commit failed: {e}"),
            };
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            items = snapshot.len(),
            pairs_scored,
            edges = edges.len(),
            elapsed_ms,
            "Batch run completed"
        );
        RunOutcome::Completed {
            items: snapshot.len(),
            pairs_scored,
            edges_written: edges.len(),
            elapsed_ms,
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn cancelled_outcome(&self) -> RunOutcome {
        tracing::warn!("Batch run cancelled, nothing committed");
        RunOutcome::Cancelled
    }

    async fn set_phase(&self, phase: PipelinePhase) {
        *self.phase.write().await = phase;
        tracing::debug!(phase = ?phase, "Pipeline phase change");
    }
}

struct ShardResult {
    pairs: u64,
    scores: TopNAccumulator,
}

/// Scores every pair (i, j), i < j, whose lower index belongs to this shard
///
/// Shards take rows of the pair triangle by stride over the sorted id list,
/// which balances work and is independent of scheduling order. Returns
/// `None` if cancellation was observed mid-shard.
fn score_shard(
    snapshot: &AttributeSnapshot,
    ids: &[i64],
    shard: usize,
    shard_count: usize,
    top_n: usize,
    cancel: &AtomicBool,
) -> Option<ShardResult> {
    let mut scores = TopNAccumulator::new(top_n);
    let mut pairs: u64 = 0;

    for (index, &a) in ids.iter().enumerate() {
        if index % shard_count != shard {
            continue;
        }
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        let Some(attrs_a) = snapshot.get(a) else {
            continue;
        };
        for &b in &ids[index + 1..] {
            let Some(attrs_b) = snapshot.get(b) else {
                continue;
            };
            let score = combine::score_pair(attrs_a, attrs_b);
            scores.push_pair(a, b, score);
            pairs += 1;
        }
    }

    Some(ShardResult { pairs, scores })
}

/// Converts per-item top-N lists into a deduplicated canonical edge set
///
/// An edge kept by either endpoint's list is persisted once, lower id
/// first; both endpoints' serving reads resolve through the same row.
fn collect_edges(lists: HashMap<i64, Vec<RelatedItem>>) -> Vec<SimilarityEdge> {
    let mut edges: BTreeMap<(i64, i64), f64> = BTreeMap::new();
    for (item_id, related) in lists {
        for candidate in related {
            let edge = SimilarityEdge::new(item_id, candidate.item_id, candidate.score);
            edges.insert((edge.lower_id, edge.higher_id), edge.score);
        }
    }
    edges
        .into_iter()
        .map(|((lower_id, higher_id), score)| SimilarityEdge {
            lower_id,
            higher_id,
            score,
        })
        .collect()
}
