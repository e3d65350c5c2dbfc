//! Set and hash-sequence similarity measures.

use crate::hash::Hash64;
use crate::shingles::TextShingleSet;

/// Jaccard similarity `|A ∩ B| / |A ∪ B|` in `[0, 1]`.
///
/// Two empty sets score 0: no content is not evidence of copying.
///
/// ```rust
/// use perceptual::{jaccard, shingle};
///
/// let a = shingle("a b c d e f", 3);
/// assert_eq!(jaccard(&a, &a), 1.0);
/// ```
pub fn jaccard(a: &TextShingleSet, b: &TextShingleSet) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection_len(b);
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Fraction of `source` hashes whose nearest `candidate` hash lies within
/// `max_distance` bits, in `[0, 1]`.
///
/// The measure is directional: it answers how much of the source appears in
/// the candidate. An empty side scores 0.
pub fn sequence_overlap(source: &[Hash64], candidate: &[Hash64], max_distance: u32) -> f64 {
    if source.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    let matched = source
        .iter()
        .filter(|s| {
            candidate
                .iter()
                .map(|c| s.hamming_distance(*c))
                .min()
                .is_some_and(|d| d <= max_distance)
        })
        .count();
    matched as f64 / source.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shingles::shingle;

    #[test]
    fn identical_sets_score_one() {
        let a = shingle("the quick brown fox jumps", 3);
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn disjoint_sets_score_zero() {
        let a = shingle("one two three four", 3);
        let b = shingle("five six seven eight", 3);
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn both_empty_scores_zero() {
        assert_eq!(jaccard(&TextShingleSet::new(), &TextShingleSet::new()), 0.0);
    }

    #[test]
    fn one_empty_scores_zero() {
        let a = shingle("a b c", 3);
        assert_eq!(jaccard(&a, &TextShingleSet::new()), 0.0);
    }

    #[test]
    fn half_overlap() {
        let a: TextShingleSet = ["a", "b", "c"].into_iter().collect();
        let b: TextShingleSet = ["a", "b", "d"].into_iter().collect();
        assert_eq!(jaccard(&a, &b), 0.5);
    }

    #[test]
    fn sequence_overlap_counts_near_matches() {
        let source = [Hash64(0), Hash64(u64::MAX), Hash64(0xff)];
        let candidate = [Hash64(0b111)];
        // 0 -> 3 bits, MAX -> 61 bits, 0xff -> 5 bits.
        let score = sequence_overlap(&source, &candidate, 10);
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn sequence_overlap_empty_is_zero() {
        assert_eq!(sequence_overlap(&[], &[Hash64(1)], 10), 0.0);
        assert_eq!(sequence_overlap(&[Hash64(1)], &[], 10), 0.0);
    }
}
