pub mod item;
pub mod related;

pub use item::{CatalogItem, ScriptureRef};
pub use related::{PipelinePhase, RelatedItem, RunOutcome, SimilarityEdge};
