//! Persistence seams for the catalog and the relatedness store
//!
//! Both are trait objects so the pipeline and handlers never care whether
//! they are talking to Postgres or to the in-memory implementations used
//! by tests and local runs.

use crate::error::AppResult;
use crate::models::{CatalogItem, RelatedItem, SimilarityEdge};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryCatalog, MemoryRelatednessStore};
pub use postgres::{create_pool, PostgresCatalog, PostgresRelatednessStore};

/// Read-only view of the media catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Lists every current catalog item with its attribute associations
    ///
    /// Called exactly once per batch run by the snapshot loader.
    async fn list_items(&self) -> AppResult<Vec<CatalogItem>>;
}

/// Persistent store for pre-computed relatedness scores
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RelatednessStore: Send + Sync {
    /// Atomically replaces the entire relationship set
    ///
    /// Readers must never observe a half-updated set: either the previous
    /// edges or the new edges, nothing in between.
    async fn replace_all(&self, edges: &[SimilarityEdge]) -> AppResult<()>;

    /// Reads an item's persisted related items, best first
    ///
    /// Returns an empty list for an item with no stored relationships
    /// (e.g. added after the last batch run).
    async fn get_related(&self, item_id: i64, limit: usize) -> AppResult<Vec<RelatedItem>>;
}
