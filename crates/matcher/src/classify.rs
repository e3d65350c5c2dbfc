use crate::types::{MatchType, SimilarityThresholds};

/// Bucket an integer similarity percent.
pub fn classify(percent: u8, thresholds: &SimilarityThresholds) -> MatchType {
    if percent >= thresholds.exact {
        MatchType::Exact
    } else if percent >= thresholds.high {
        MatchType::High
    } else if percent >= thresholds.moderate {
        MatchType::Moderate
    } else if percent >= thresholds.low {
        MatchType::Low
    } else {
        MatchType::None
    }
}

/// Convert a `[0, 1]` similarity to an integer percent, rounding to nearest
/// and clamping. Non-finite input maps to 0.
pub fn similarity_percent(similarity: f64) -> u8 {
    if !similarity.is_finite() {
        return 0;
    }
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bucket_edges() {
        let t = SimilarityThresholds::default();
        assert_eq!(classify(100, &t), MatchType::Exact);
        assert_eq!(classify(95, &t), MatchType::Exact);
        assert_eq!(classify(94, &t), MatchType::High);
        assert_eq!(classify(80, &t), MatchType::High);
        assert_eq!(classify(79, &t), MatchType::Moderate);
        assert_eq!(classify(60, &t), MatchType::Moderate);
        assert_eq!(classify(59, &t), MatchType::Low);
        assert_eq!(classify(30, &t), MatchType::Low);
        assert_eq!(classify(29, &t), MatchType::None);
        assert_eq!(classify(0, &t), MatchType::None);
    }

    #[test]
    fn classification_is_monotonic_with_five_buckets() {
        let t = SimilarityThresholds::default();
        let buckets: Vec<MatchType> = (0..=100).map(|p| classify(p, &t)).collect();
        assert!(buckets.windows(2).all(|w| w[0] <= w[1]));

        let mut distinct = buckets.clone();
        distinct.dedup();
        assert_eq!(
            distinct,
            vec![
                MatchType::None,
                MatchType::Low,
                MatchType::Moderate,
                MatchType::High,
                MatchType::Exact
            ]
        );
    }

    #[test]
    fn custom_thresholds_apply() {
        let t = SimilarityThresholds {
            exact: 100,
            high: 90,
            moderate: 70,
            low: 50,
        };
        assert_eq!(classify(99, &t), MatchType::High);
        assert_eq!(classify(49, &t), MatchType::None);
    }

    #[test]
    fn percent_rounds_and_clamps() {
        assert_eq!(similarity_percent(0.5), 50);
        assert_eq!(similarity_percent(0.844), 84);
        assert_eq!(similarity_percent(0.846), 85);
        assert_eq!(similarity_percent(1.0), 100);
        assert_eq!(similarity_percent(1.7), 100);
        assert_eq!(similarity_percent(-0.2), 0);
        assert_eq!(similarity_percent(f64::NAN), 0);
    }
}
