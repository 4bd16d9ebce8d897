// marksman-scoring/src/similarity/mod.rs
//! String similarity measures used by fuzzy keyword matching and by the
//! relevance signal.

use std::collections::HashSet;

use dissimilar::Chunk;

/// Normalized sequence-similarity ratio in [0, 1].
///
/// Computed as `2 * M / T`, where `T` is the total number of characters in
/// both strings and `M` is the number of characters in the equal segments
/// of their character diff. Two empty strings are identical (1.0).
///
/// The diff applies semantic cleanup, which merges short coincidental
/// equalities into edits. On keyword-length strings this makes no
/// difference, but on whole sentences `M` can come out smaller than a
/// longest-matching-block count, so the ratio and the relevance signal
/// built on it are slightly lower.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let matched: usize = dissimilar::diff(a, b)
        .iter()
        .map(|chunk| match chunk {
            Chunk::Equal(s) => s.chars().count(),
            Chunk::Delete(_) | Chunk::Insert(_) => 0,
        })
        .sum();

    (2 * matched) as f64 / total as f64
}

/// Similarity between two keyword names: the sequence ratio, raised to at
/// least `containment_floor` when one name contains the other.
pub fn keyword_similarity(reference: &str, candidate: &str, containment_floor: f64) -> f64 {
    let ratio = sequence_ratio(reference, candidate);
    if reference.contains(candidate) || candidate.contains(reference) {
        ratio.max(containment_floor)
    } else {
        ratio
    }
}

/// Fraction of the reference's distinct whitespace-separated words that also
/// appear in the candidate.
pub fn word_overlap(candidate: &str, reference: &str) -> f64 {
    let reference_words: HashSet<&str> = reference.split_whitespace().collect();
    if reference_words.is_empty() {
        return 0.0;
    }
    let candidate_words: HashSet<&str> = candidate.split_whitespace().collect();
    let shared = reference_words.intersection(&candidate_words).count();
    shared as f64 / reference_words.len() as f64
}
