// marksman-scoring/src/matcher/mod.rs
//! Matches a student's keywords against the reference keyword index.
//!
//! Reference keywords are visited in index (insertion) order. For each one an
//! exact match is tried first; only when it fails are fuzzy candidates of the
//! same entity type considered. A student keyword consumed by an exact match
//! is no longer a fuzzy candidate for reference keywords visited after it.

use std::collections::HashSet;

use log::debug;

use crate::keywords::{KeywordEntry, KeywordIndex, KeywordScoreMap};
use crate::policy::ScoringPolicy;
use crate::similarity::keyword_similarity;

/// Result of matching one student text against the reference index.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Normalized keyword scores, one per reference keyword.
    pub scores: KeywordScoreMap,
    /// Reference keywords that received a non-zero score, in index order.
    pub extracted: Vec<String>,
}

/// Score for an exact match of `reference` by `student`.
pub fn exact_match_score(reference: &KeywordEntry, student: &KeywordEntry, policy: &ScoringPolicy) -> f64 {
    let type_bonus = if reference.entity_type == student.entity_type {
        policy.type_bonus
    } else {
        1.0
    };
    let mention_ratio = f64::from(student.mention_count) / reference.effective_mentions();
    reference.salience * type_bonus * mention_ratio.min(policy.mention_ratio_cap)
}

/// Best fuzzy score for `reference` among `candidates`, or `None` when no
/// candidate of the same type clears the keyword-match threshold.
///
/// The candidate maximizing `similarity * salience` wins; on a tie the
/// earlier candidate is kept.
pub fn best_fuzzy_score<'a, I>(reference: &KeywordEntry, candidates: I, policy: &ScoringPolicy) -> Option<f64>
where
    I: IntoIterator<Item = &'a KeywordEntry>,
{
    let mut best: Option<f64> = None;

    for candidate in candidates {
        if candidate.entity_type != reference.entity_type {
            continue;
        }
        let similarity = keyword_similarity(&reference.name, &candidate.name, policy.containment_similarity);
        if similarity <= policy.keyword_match_threshold {
            continue;
        }
        let score = similarity * reference.salience;
        if best.map_or(true, |b| score > b) {
            best = Some(score);
        }
    }

    best
}

/// Matches `student` entries against `index` and normalizes the scores by the
/// total reference salience (1 when that total is zero).
pub fn match_keywords(index: &KeywordIndex, student: &[KeywordEntry], policy: &ScoringPolicy) -> MatchOutcome {
    let mut scores = index.empty_score_map();
    let mut consumed: HashSet<&str> = HashSet::new();

    for reference in index.iter() {
        if let Some(hit) = student.iter().find(|s| s.name == reference.name) {
            let score = exact_match_score(reference, hit, policy);
            debug!("Exact match for '{}': {:.4}", reference.name, score);
            scores.set(&reference.name, score);
            consumed.insert(hit.name.as_str());
            continue;
        }

        let candidates = student.iter().filter(|s| !consumed.contains(s.name.as_str()));
        if let Some(score) = best_fuzzy_score(reference, candidates, policy) {
            debug!("Fuzzy match for '{}': {:.4}", reference.name, score);
            scores.set(&reference.name, score);
        }
    }

    let total_salience = index.total_salience();
    let divisor = if total_salience > 0.0 { total_salience } else { 1.0 };
    let scores = scores.map_values(|_, v| v / divisor);

    let extracted = scores
        .iter()
        .filter(|(_, v)| *v > 0.0)
        .map(|(name, _)| name.to_string())
        .collect();

    MatchOutcome { scores, extracted }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::EntityType;

    const EPSILON: f64 = 1e-9;

    fn kw(name: &str, salience: f64, entity_type: EntityType, mentions: u32) -> KeywordEntry {
        KeywordEntry::new(name, salience, entity_type, mentions)
    }

    #[test]
    fn test_exact_match_type_bonus_unit_ratio() {
        let policy = ScoringPolicy::default();
        let r = kw("stack", 0.6, EntityType::Other, 1);
        let s = kw("stack", 0.0, EntityType::Other, 1);
        assert!((exact_match_score(&r, &s, &policy) - 0.6 * 1.1).abs() < EPSILON);
    }

    #[test]
    fn test_exact_match_mention_ratio_capped() {
        let policy = ScoringPolicy::default();
        let r = kw("stack", 0.5, EntityType::Other, 1);
        let s = kw("stack", 0.0, EntityType::Event, 4);
        assert!((exact_match_score(&r, &s, &policy) - 0.5 * 1.5).abs() < EPSILON);
    }

    #[test]
    fn test_exact_match_zero_reference_mentions_treated_as_one() {
        let policy = ScoringPolicy::default();
        let r = kw("stack", 0.5, EntityType::Other, 0);
        let s = kw("stack", 0.0, EntityType::Other, 1);
        assert!((exact_match_score(&r, &s, &policy) - 0.55).abs() < EPSILON);
    }

    #[test]
    fn test_stack_queue_scenario() {
        let policy = ScoringPolicy::default();
        let index = KeywordIndex::build(vec![
            kw("stack", 0.6, EntityType::Other, 2),
            kw("queue", 0.4, EntityType::Other, 1),
        ]);
        let student = vec![kw("stack", 0.9, EntityType::Other, 1)];

        let outcome = match_keywords(&index, &student, &policy);

        assert!((outcome.scores.get("stack").unwrap() - 0.33).abs() < EPSILON);
        assert_eq!(outcome.scores.get("queue"), Some(0.0));
        assert_eq!(outcome.extracted, vec!["stack".to_string()]);
    }

    #[test]
    fn test_fuzzy_match_requires_same_type() {
        let policy = ScoringPolicy::default();
        let index = KeywordIndex::build(vec![kw("photosynthesis", 1.0, EntityType::Other, 1)]);
        let student = vec![kw("photosynthesys", 0.5, EntityType::Person, 1)];

        let outcome = match_keywords(&index, &student, &policy);
        assert_eq!(outcome.scores.get("photosynthesis"), Some(0.0));
        assert!(outcome.extracted.is_empty());
    }

    #[test]
    fn test_fuzzy_match_scores_similarity_times_salience() {
        let policy = ScoringPolicy::default();
        let index = KeywordIndex::build(vec![kw("tree", 0.5, EntityType::Other, 1)]);
        let student = vec![kw("binary search tree", 0.5, EntityType::Other, 1)];

        let outcome = match_keywords(&index, &student, &policy);
        // containment floor 0.85 * salience 0.5, normalized by total salience 0.5
        assert!((outcome.scores.get("tree").unwrap() - 0.85).abs() < EPSILON);
    }

    #[test]
    fn test_fuzzy_below_threshold_stays_zero() {
        let policy = ScoringPolicy::default();
        let index = KeywordIndex::build(vec![kw("mitochondria", 1.0, EntityType::Other, 1)]);
        let student = vec![kw("chloroplast", 1.0, EntityType::Other, 1)];

        let outcome = match_keywords(&index, &student, &policy);
        assert_eq!(outcome.scores.get("mitochondria"), Some(0.0));
    }

    #[test]
    fn test_exact_consumed_keyword_not_fuzzy_candidate_later() {
        let policy = ScoringPolicy::default();
        // "stack" is exactly matched first, then "stacks" may not reuse it.
        let index = KeywordIndex::build(vec![
            kw("stack", 0.5, EntityType::Other, 1),
            kw("stacks", 0.5, EntityType::Other, 1),
        ]);
        let student = vec![kw("stack", 1.0, EntityType::Other, 1)];

        let outcome = match_keywords(&index, &student, &policy);
        assert!(outcome.scores.get("stack").unwrap() > 0.0);
        assert_eq!(outcome.scores.get("stacks"), Some(0.0));
    }

    #[test]
    fn test_best_fuzzy_candidate_wins() {
        let policy = ScoringPolicy::default();
        let reference = kw("tree", 1.0, EntityType::Other, 1);
        let weak = kw("binary search tree", 1.0, EntityType::Other, 1);
        let strong = kw("trees", 1.0, EntityType::Other, 1);

        let best = best_fuzzy_score(&reference, [&weak, &strong], &policy).unwrap();
        // "tree" vs "trees": 2*4/9
        assert!((best - 8.0 / 9.0).abs() < EPSILON);
    }

    #[test]
    fn test_zero_total_salience_divides_by_one() {
        let policy = ScoringPolicy::default();
        let index = KeywordIndex::build(vec![kw("stack", 0.0, EntityType::Other, 1)]);
        let student = vec![kw("stack", 0.0, EntityType::Other, 1)];

        let outcome = match_keywords(&index, &student, &policy);
        assert_eq!(outcome.scores.get("stack"), Some(0.0));
        assert!(outcome.extracted.is_empty());
    }
}
