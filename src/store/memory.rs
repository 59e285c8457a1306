//! In-memory store implementations
//!
//! Used by the integration tests and by local runs without a database.
//! Both uphold the same contracts as the Postgres implementations,
//! including whole-set replacement and the serving sort order.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::models::{CatalogItem, RelatedItem, SimilarityEdge};

use super::{CatalogStore, RelatednessStore};

/// In-memory catalog
#[derive(Default)]
pub struct MemoryCatalog {
    items: RwLock<BTreeMap<i64, CatalogItem>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_item(&self, item: CatalogItem) {
        self.items.write().await.insert(item.id, item);
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemoryCatalog {
    async fn list_items(&self) -> AppResult<Vec<CatalogItem>> {
        Ok(self.items.read().await.values().cloned().collect())
    }
}

/// In-memory relatedness store keyed by canonical pair
#[derive(Default)]
pub struct MemoryRelatednessStore {
    edges: RwLock<BTreeMap<(i64, i64), f64>>,
}

impl MemoryRelatednessStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored edges
    pub async fn edge_count(&self) -> usize {
        self.edges.read().await.len()
    }
}

#[async_trait::async_trait]
impl RelatednessStore for MemoryRelatednessStore {
    async fn replace_all(&self, edges: &[SimilarityEdge]) -> AppResult<()> {
        let replacement: BTreeMap<(i64, i64), f64> = edges
            .iter()
            .map(|edge| ((edge.lower_id, edge.higher_id), edge.score))
            .collect();

        // Swap under one write lock so readers see old or new, never a mix
        *self.edges.write().await = replacement;
        Ok(())
    }

    async fn get_related(&self, item_id: i64, limit: usize) -> AppResult<Vec<RelatedItem>> {
        let edges = self.edges.read().await;
        let mut related: Vec<RelatedItem> = edges
            .iter()
            .filter_map(|(&(lower, higher), &score)| {
                if lower == item_id {
                    Some(RelatedItem {
                        item_id: higher,
                        score,
                    })
                } else if higher == item_id {
                    Some(RelatedItem {
                        item_id: lower,
                        score,
                    })
                } else {
                    None
                }
            })
            .collect();

        related.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        related.truncate(limit);
        Ok(related)
    }
}
