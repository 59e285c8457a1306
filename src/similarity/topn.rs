//! Per-item top-N selection
//!
//! Each scoring worker owns a private accumulator; accumulators are merged
//! once after all shards finish. Insertion and merging are commutative and
//! associative given the fixed tie-break, so the final lists are identical
//! no matter how the pair space was sharded.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::RelatedItem;

/// Ordering for candidate lists: descending score, then ascending item id
///
/// Tie-breaking on the identifier rather than arrival order is what keeps
/// concurrent scoring deterministic.
fn candidate_order(a: &RelatedItem, b: &RelatedItem) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.item_id.cmp(&b.item_id))
}

/// Accumulates the top-N highest-scoring related items per catalog item
#[derive(Debug, Clone)]
pub struct TopNAccumulator {
    n: usize,
    entries: HashMap<i64, Vec<RelatedItem>>,
}

impl TopNAccumulator {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            entries: HashMap::new(),
        }
    }

    /// Offers a scored candidate for one item's list
    ///
    /// Zero scores are never retained: an absent relationship and a
    /// zero-evidence relationship are indistinguishable to the serving
    /// layer, and dropping them keeps the store O(items · N) instead of
    /// O(items²).
    pub fn push(&mut self, item_id: i64, candidate: RelatedItem) {
        if candidate.score <= 0.0 || self.n == 0 {
            return;
        }

        let list = self.entries.entry(item_id).or_default();
        let position = list
            .binary_search_by(|existing| candidate_order(existing, &candidate))
            .unwrap_or_else(|insert_at| insert_at);
        if position >= self.n {
            return;
        }
        list.insert(position, candidate);
        list.truncate(self.n);
    }

    /// Offers one scored pair to both endpoints' lists
    pub fn push_pair(&mut self, a: i64, b: i64, score: f64) {
        self.push(a, RelatedItem { item_id: b, score });
        self.push(b, RelatedItem { item_id: a, score });
    }

    /// Folds another accumulator into this one
    pub fn merge(&mut self, other: TopNAccumulator) {
        for (item_id, candidates) in other.entries {
            for candidate in candidates {
                self.push(item_id, candidate);
            }
        }
    }

    /// Finished per-item lists, each sorted by descending score with the
    /// id tie-break
    pub fn into_lists(self) -> HashMap<i64, Vec<RelatedItem>> {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn related(item_id: i64, score: f64) -> RelatedItem {
        RelatedItem { item_id, score }
    }

    #[test]
    fn test_retains_top_n_of_many_candidates() {
        let mut acc = TopNAccumulator::new(10);
        // 15 nonzero candidates with distinct scores
        for i in 1..=15 {
            acc.push(0, related(i, i as f64 / 100.0));
        }

        let lists = acc.into_lists();
        let list = &lists[&0];
        assert_eq!(list.len(), 10);
        // Highest score first, lowest retained is candidate 6
        assert_eq!(list[0].item_id, 15);
        assert_eq!(list[9].item_id, 6);
    }

    #[test]
    fn test_ties_break_by_ascending_id() {
        let mut acc = TopNAccumulator::new(3);
        acc.push(0, related(9, 0.5));
        acc.push(0, related(2, 0.5));
        acc.push(0, related(7, 0.5));
        acc.push(0, related(4, 0.5));

        let lists = acc.into_lists();
        let ids: Vec<i64> = lists[&0].iter().map(|r| r.item_id).collect();
        assert_eq!(ids, vec![2, 4, 7]);
    }

    #[test]
    fn test_zero_scores_are_dropped() {
        let mut acc = TopNAccumulator::new(10);
        acc.push(0, related(1, 0.0));
        assert!(acc.is_empty());
    }

    #[test]
    fn test_push_pair_feeds_both_endpoints() {
        let mut acc = TopNAccumulator::new(10);
        acc.push_pair(3, 7, 0.25);

        let lists = acc.into_lists();
        assert_eq!(lists[&3], vec![related(7, 0.25)]);
        assert_eq!(lists[&7], vec![related(3, 0.25)]);
    }

    #[test]
    fn test_merge_matches_single_accumulator() {
        let candidates: Vec<(i64, f64)> = vec![
            (1, 0.9),
            (2, 0.3),
            (3, 0.3),
            (4, 0.75),
            (5, 0.1),
            (6, 0.3),
        ];

        let mut single = TopNAccumulator::new(4);
        for &(id, score) in &candidates {
            single.push(0, related(id, score));
        }

        let mut left = TopNAccumulator::new(4);
        let mut right = TopNAccumulator::new(4);
        for (i, &(id, score)) in candidates.iter().enumerate() {
            if i % 2 == 0 {
                left.push(0, related(id, score));
            } else {
                right.push(0, related(id, score));
            }
        }
        left.merge(right);

        assert_eq!(single.into_lists()[&0], left.into_lists()[&0]);
    }
}
