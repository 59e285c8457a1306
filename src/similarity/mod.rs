//! Similarity scoring engine and batch pre-computation pipeline
//!
//! The metric library and combiner turn heterogeneous item metadata into a
//! single bounded score per item pair; the pipeline computes all pairs over
//! an immutable snapshot, keeps the top-N per item, and commits the result
//! as one atomic replacement of the relatedness store.

pub mod combine;
pub mod metrics;
pub mod pipeline;
pub mod snapshot;
pub mod text;
pub mod topn;

pub use combine::{combined_score, score_pair, MetricScores};
pub use pipeline::BatchRunner;
pub use snapshot::{AttributeSnapshot, ItemAttributes};
