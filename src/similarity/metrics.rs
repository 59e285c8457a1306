//! Pairwise similarity metrics
//!
//! Each metric maps two same-kind attribute sets to a value in [0.0, 1.0]
//! and returns exactly 0.0 when either input is empty. Missing metadata is
//! "no evidence of similarity", never an error, so a sparsely tagged item
//! degrades gracefully instead of poisoning the run.

use std::collections::HashSet;
use std::hash::Hash;

use crate::models::ScriptureRef;

/// Jaccard similarity: |A∩B| / |A∪B|
///
/// Used for tags and characters. Two items that both lack the attribute
/// score 0.0, not 1.0; shared absence is not evidence.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Max-normalized overlap: |A∩B| / max(|A|, |B|)
///
/// Used for speakers, where a full subset match should not score 1.0 when
/// one item has many more speakers than the other.
pub fn max_overlap<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / a.len().max(b.len()) as f64
}

/// Overlap coefficient: |A∩B| / min(|A|, |B|)
///
/// Used for the word sets derived from item name + description.
pub fn overlap_coefficient<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / a.len().min(b.len()) as f64
}

/// Hierarchical scripture similarity
///
/// A cross-product reduction rather than a set intersection: every
/// reference in A is matched against every reference in B with
/// [`ScriptureRef::match_score`], and the sum is normalized by |A|·|B|.
/// A verse can partially match a different verse in the same chapter or
/// book, which plain set intersection cannot express.
pub fn scripture_similarity(a: &[ScriptureRef], b: &[ScriptureRef]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let total: f64 = a
        .iter()
        .map(|ra| b.iter().map(|rb| ra.match_score(rb)).sum::<f64>())
        .sum();
    total / (a.len() * b.len()) as f64
}
