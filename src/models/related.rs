use serde::{Deserialize, Serialize};

/// An undirected similarity relationship between two catalog items
///
/// Stored in canonical form with the lower identifier first, so each
/// unordered pair has exactly one row and symmetry is structural.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEdge {
    pub lower_id: i64,
    pub higher_id: i64,
    /// Combined similarity score in [0.0, 1.0]
    pub score: f64,
}

impl SimilarityEdge {
    /// Creates an edge in canonical form regardless of argument order
    pub fn new(a: i64, b: i64, score: f64) -> Self {
        let (lower_id, higher_id) = if a <= b { (a, b) } else { (b, a) };
        Self {
            lower_id,
            higher_id,
            score,
        }
    }

    /// The endpoint that is not `item_id`
    pub fn other(&self, item_id: i64) -> i64 {
        if self.lower_id == item_id {
            self.higher_id
        } else {
            self.lower_id
        }
    }
}

/// One entry of an item's persisted top-N list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelatedItem {
    pub item_id: i64,
    pub score: f64,
}

/// Phase of the batch ranking pipeline, observable via the status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    Idle,
    Loading,
    Scoring,
    Merging,
    Committing,
    Failed,
}

/// Outcome of one batch run, reported to the operational trigger
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed {
        items: usize,
        pairs_scored: u64,
        edges_written: usize,
        elapsed_ms: u64,
    },
    Failed {
        reason: String,
    },
    Cancelled,
}
