//! Weighted combination of the per-category metric outputs

use super::metrics;
use super::snapshot::ItemAttributes;

/// Fixed combination weights; must sum to 1.0 so the combined score stays
/// in [0.0, 1.0] whenever every metric does.
pub const TAG_WEIGHT: f64 = 0.4;
pub const SPEAKER_WEIGHT: f64 = 0.2;
pub const SCRIPTURE_WEIGHT: f64 = 0.15;
pub const CHARACTER_WEIGHT: f64 = 0.15;
pub const TEXT_WEIGHT: f64 = 0.1;

/// The four metric outputs for one item pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricScores {
    pub tag: f64,
    pub speaker: f64,
    pub scripture: f64,
    pub character: f64,
    pub text: f64,
}

/// Linear combination of the metric outputs
///
/// Pure; out-of-range inputs are a programming-contract violation, not a
/// recoverable condition.
pub fn combined_score(scores: &MetricScores) -> f64 {
    for metric in [
        scores.tag,
        scores.speaker,
        scores.scripture,
        scores.character,
        scores.text,
    ] {
        debug_assert!(
            (0.0..=1.0).contains(&metric),
            "metric output out of range: {metric}"
        );
    }

    TAG_WEIGHT * scores.tag
        + SPEAKER_WEIGHT * scores.speaker
        + SCRIPTURE_WEIGHT * scores.scripture
        + CHARACTER_WEIGHT * scores.character
        + TEXT_WEIGHT * scores.text
}

/// Computes all four metrics for a pair of items and combines them
pub fn score_pair(a: &ItemAttributes, b: &ItemAttributes) -> f64 {
    let scores = MetricScores {
        tag: metrics::jaccard(&a.tags, &b.tags),
        speaker: metrics::max_overlap(&a.speakers, &b.speakers),
        scripture: metrics::scripture_similarity(&a.scriptures, &b.scriptures),
        character: metrics::jaccard(&a.characters, &b.characters),
        text: metrics::overlap_coefficient(&a.words, &b.words),
    };
    combined_score(&scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        let sum = TAG_WEIGHT + SPEAKER_WEIGHT + SCRIPTURE_WEIGHT + CHARACTER_WEIGHT + TEXT_WEIGHT;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_combined_score_mixed_metrics() {
        // tag 1/3, no speakers, scripture 0.5, no characters, text 0.2
        let scores = MetricScores {
            tag: 1.0 / 3.0,
            speaker: 0.0,
            scripture: 0.5,
            character: 0.0,
            text: 0.2,
        };
        let expected = 0.4 * (1.0 / 3.0) + 0.15 * 0.5 + 0.1 * 0.2;
        let combined = combined_score(&scores);
        assert!((combined - expected).abs() < 1e-9);
        assert!((combined - 0.2283).abs() < 1e-3);
    }

    #[test]
    fn test_combined_score_bounds() {
        let zeros = MetricScores {
            tag: 0.0,
            speaker: 0.0,
            scripture: 0.0,
            character: 0.0,
            text: 0.0,
        };
        assert_eq!(combined_score(&zeros), 0.0);

        let ones = MetricScores {
            tag: 1.0,
            speaker: 1.0,
            scripture: 1.0,
            character: 1.0,
            text: 1.0,
        };
        assert!((combined_score(&ones) - 1.0).abs() < 1e-12);
    }
}
