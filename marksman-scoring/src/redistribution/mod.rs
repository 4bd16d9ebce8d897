// marksman-scoring/src/redistribution/mod.rs
//! Reallocates score mass from unmatched keywords onto matched ones.

use log::debug;

use crate::keywords::KeywordScoreMap;
use crate::policy::RedistributionMode;

/// Moves the mass of every keyword scoring below `missing_threshold` onto the
/// keywords at or above it.
///
/// The returned map has the same key set as the input; donors end at 0.0.
/// The input is returned unchanged when nothing is missing or when nothing is
/// left to receive. In the second case the missing mass is dropped and never
/// renormalized, which keeps grading lenient.
pub fn redistribute(scores: &KeywordScoreMap, missing_threshold: f64, mode: RedistributionMode) -> KeywordScoreMap {
    let is_missing = |v: f64| v < missing_threshold;

    let missing_mass: f64 = scores.values().filter(|&v| is_missing(v)).sum();
    let missing_count = scores.values().filter(|&v| is_missing(v)).count();
    let recipients = scores.len() - missing_count;

    if missing_count == 0 || recipients == 0 {
        return scores.clone();
    }

    let recipient_mass: f64 = scores.values().filter(|&v| !is_missing(v)).sum();
    debug!(
        "Redistributing {:.4} from {} missing keyword(s) onto {} recipient(s) ({:?}).",
        missing_mass, missing_count, recipients, mode
    );

    scores.map_values(|_, v| {
        if is_missing(v) {
            return 0.0;
        }
        match mode {
            RedistributionMode::Even => v + missing_mass / recipients as f64,
            RedistributionMode::Proportional if recipient_mass > 0.0 => {
                v + v / recipient_mass * missing_mass
            }
            RedistributionMode::Proportional => v + missing_mass / recipients as f64,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_even_redistribution_conserves_mass() {
        let before = KeywordScoreMap::from_pairs([("a", 0.5), ("b", 0.3), ("c", 0.05), ("d", 0.07)]);
        let after = redistribute(&before, 0.1, RedistributionMode::Even);

        assert!((after.sum() - before.sum()).abs() < EPSILON);
        assert!((after.get("a").unwrap() - 0.56).abs() < EPSILON);
        assert!((after.get("b").unwrap() - 0.36).abs() < EPSILON);
        assert_eq!(after.get("c"), Some(0.0));
        assert_eq!(after.get("d"), Some(0.0));
        assert_eq!(after.keys().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_even_bonus_is_flat_not_proportional() {
        let before = KeywordScoreMap::from_pairs([("a", 0.9), ("b", 0.1), ("c", 0.02)]);
        let after = redistribute(&before, 0.1, RedistributionMode::Even);
        assert!((after.get("a").unwrap() - 0.91).abs() < EPSILON);
        assert!((after.get("b").unwrap() - 0.11).abs() < EPSILON);
    }

    #[test]
    fn test_no_missing_is_noop() {
        let before = KeywordScoreMap::from_pairs([("a", 0.5), ("b", 0.3)]);
        assert_eq!(redistribute(&before, 0.1, RedistributionMode::Even), before);
    }

    #[test]
    fn test_no_recipients_returns_input_unchanged() {
        let before = KeywordScoreMap::from_pairs([("a", 0.05), ("b", 0.02)]);
        assert_eq!(redistribute(&before, 0.1, RedistributionMode::Even), before);
    }

    #[test]
    fn test_zero_mass_missing_keyword_leaves_scores_unchanged() {
        let before = KeywordScoreMap::from_pairs([("stack", 0.33), ("queue", 0.0)]);
        let after = redistribute(&before, 0.1, RedistributionMode::Even);
        assert!((after.get("stack").unwrap() - 0.33).abs() < EPSILON);
        assert_eq!(after.get("queue"), Some(0.0));
    }

    #[test]
    fn test_proportional_redistribution() {
        let before = KeywordScoreMap::from_pairs([("a", 0.6), ("b", 0.2), ("c", 0.05)]);
        let after = redistribute(&before, 0.1, RedistributionMode::Proportional);
        assert!((after.get("a").unwrap() - (0.6 + 0.75 * 0.05)).abs() < EPSILON);
        assert!((after.get("b").unwrap() - (0.2 + 0.25 * 0.05)).abs() < EPSILON);
        assert!((after.sum() - before.sum()).abs() < EPSILON);
    }
}
