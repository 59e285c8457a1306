//! Point-in-time snapshot of catalog metadata
//!
//! The pipeline reads the catalog exactly once per run and scores against
//! this immutable copy, so every pairwise comparison in a run sees the same
//! consistent view regardless of catalog writes happening underneath.

use std::collections::{BTreeMap, HashSet};

use crate::error::{AppError, AppResult};
use crate::models::{CatalogItem, ScriptureRef};
use crate::store::CatalogStore;

use super::text;

/// One item's attribute sets, prepared for the scoring hot loop
#[derive(Debug, Clone, Default)]
pub struct ItemAttributes {
    pub tags: HashSet<i64>,
    pub speakers: HashSet<i64>,
    pub characters: HashSet<i64>,
    pub scriptures: Vec<ScriptureRef>,
    /// Word set tokenized from name + description at load time
    pub words: HashSet<String>,
}

impl ItemAttributes {
    fn from_item(item: &CatalogItem) -> Self {
        Self {
            tags: item.tags.iter().copied().collect(),
            speakers: item.speakers.iter().copied().collect(),
            characters: item.characters.iter().copied().collect(),
            scriptures: item.scriptures.clone(),
            words: text::word_set(&item.text()),
        }
    }
}

/// Immutable mapping from item id to its attribute sets
///
/// Keyed by a `BTreeMap` so iteration over item ids is ascending, which the
/// pipeline relies on for deterministic pair ordering and sharding.
#[derive(Debug, Default)]
pub struct AttributeSnapshot {
    items: BTreeMap<i64, ItemAttributes>,
}

impl AttributeSnapshot {
    /// Materializes a snapshot covering every item in the catalog
    ///
    /// Fails with `SourceUnavailable` if the catalog cannot be read; the
    /// caller aborts the run rather than proceeding with partial data.
    pub async fn load(catalog: &dyn CatalogStore) -> AppResult<Self> {
        let items = catalog.list_items().await.map_err(|e| match e {
            AppError::Database(inner) => AppError::SourceUnavailable(inner.to_string()),
            other => other,
        })?;

        let snapshot = Self::from_items(&items);
        tracing::info!(items = snapshot.len(), "Catalog snapshot loaded");
        Ok(snapshot)
    }

    /// Builds a snapshot directly from catalog items
    pub fn from_items(items: &[CatalogItem]) -> Self {
        let items = items
            .iter()
            .map(|item| (item.id, ItemAttributes::from_item(item)))
            .collect();
        Self { items }
    }

    pub fn get(&self, id: i64) -> Option<&ItemAttributes> {
        self.items.get(&id)
    }

    /// Item ids in ascending order
    pub fn ids(&self) -> Vec<i64> {
        self.items.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with_tags(id: i64, tags: &[i64]) -> CatalogItem {
        let mut item = CatalogItem::new(id, format!("Item {id}"), "");
        item.tags = tags.to_vec();
        item
    }

    #[test]
    fn test_snapshot_ids_are_sorted() {
        let items = vec![
            item_with_tags(9, &[]),
            item_with_tags(2, &[]),
            item_with_tags(5, &[]),
        ];
        let snapshot = AttributeSnapshot::from_items(&items);
        assert_eq!(snapshot.ids(), vec![2, 5, 9]);
    }

    #[test]
    fn test_snapshot_tokenizes_text_at_load() {
        let mut item = CatalogItem::new(1, "Walking in Grace", "A study of Romans");
        item.tags = vec![4];
        let snapshot = AttributeSnapshot::from_items(&[item]);

        let attrs = snapshot.get(1).unwrap();
        assert!(attrs.words.contains("walking"));
        assert!(attrs.words.contains("grace"));
        assert!(attrs.words.contains("romans"));
        // Stop words are already gone
        assert!(!attrs.words.contains("in"));
        assert_eq!(attrs.tags, HashSet::from([4]));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = AttributeSnapshot::from_items(&[]);
        assert!(snapshot.is_empty());
        assert!(snapshot.ids().is_empty());
        assert!(snapshot.get(1).is_none());
    }
}
