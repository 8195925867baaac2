//! Tiered fuzzy matching over a candidate string set.

use super::similarity::similarity;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Minimum Levenshtein similarity kept when no substring tier matched.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Scores one candidate against a query.
///
/// Tiers are evaluated in priority order and the first hit wins:
/// candidate-contains-query (0.9), query-contains-candidate (0.8), word
/// overlap for multi-word candidates (0.7), then raw edit-distance
/// similarity kept only at or above `threshold`. Comparison is
/// case-insensitive. Returns `None` for an empty query or an unmatched
/// candidate.
pub fn score(query: &str, candidate: &str, threshold: f64) -> Option<f64> {
    if query.is_empty() {
        return None;
    }

    let query = query.to_lowercase();
    let candidate = candidate.to_lowercase();

    if candidate.contains(&query) {
        return Some(0.9);
    }
    if query.contains(&candidate) {
        return Some(0.8);
    }
    if candidate.contains(' ')
        && candidate
            .split_whitespace()
            .any(|word| query.contains(word) || word.contains(&query))
    {
        return Some(0.7);
    }

    let similarity = similarity(&query, &candidate);
    (similarity >= threshold).then_some(similarity)
}

/// Ranks candidates against a query, best match first.
///
/// Original casing is preserved in the output. Duplicate candidate texts
/// collapse to a single entry keeping the maximum score seen. Ordering is
/// descending by score and stable with respect to input order for ties.
pub fn rank<S: AsRef<str>>(query: &str, candidates: &[S], threshold: f64) -> Vec<String> {
    let mut ordered: Vec<String> = Vec::new();
    let mut best: HashMap<String, f64> = HashMap::new();

    for candidate in candidates {
        let text = candidate.as_ref();
        let Some(score) = score(query, text, threshold) else {
            continue;
        };

        match best.entry(text.to_owned()) {
            Entry::Occupied(mut entry) => {
                if score > *entry.get() {
                    entry.insert(score);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(score);
                ordered.push(text.to_owned());
            }
        }
    }

    ordered.sort_by(|a, b| best[b].total_cmp(&best[a]));
    ordered
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_THRESHOLD, rank, score};

    fn rank_default(query: &str, candidates: &[&str]) -> Vec<String> {
        rank(query, candidates, DEFAULT_THRESHOLD)
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert!(rank_default("", &["alpha", "beta"]).is_empty());
    }

    #[test]
    fn substring_candidates_keep_input_order() {
        // Both hit the candidate-contains-query tier (0.9); the tie is
        // broken by input order.
        let ranked = rank_default("cat", &["category", "dog", "concatenate"]);
        assert_eq!(ranked, vec!["category", "concatenate"]);
    }

    #[test]
    fn tier_scores_order_the_result() {
        // "cat pictures" (word overlap, 0.7) < "cata" (query contains
        // candidate, 0.8) < "catalogue" (candidate contains query, 0.9).
        let ranked = rank_default("catalog", &["cat pictures", "cata", "catalogue"]);
        assert_eq!(ranked, vec!["catalogue", "cata", "cat pictures"]);
    }

    #[test]
    fn reverse_substring_scores_below_substring() {
        assert_eq!(score("categories", "gori", DEFAULT_THRESHOLD), Some(0.8));
        assert_eq!(score("gori", "categories", DEFAULT_THRESHOLD), Some(0.9));
    }

    #[test]
    fn word_overlap_requires_a_multi_word_candidate() {
        assert_eq!(score("networking tips", "tips", DEFAULT_THRESHOLD), Some(0.8));
        assert_eq!(
            score("networking", "career tips networking", DEFAULT_THRESHOLD),
            Some(0.9)
        );
        assert_eq!(
            score("network advice", "career tips", DEFAULT_THRESHOLD),
            None
        );
    }

    #[test]
    fn matching_is_case_insensitive_but_output_preserves_casing() {
        let ranked = rank_default("CAT", &["Category"]);
        assert_eq!(ranked, vec!["Category"]);
    }

    #[test]
    fn low_similarity_candidates_are_dropped() {
        assert!(rank_default("cat", &["zebra", "xylophone"]).is_empty());
    }

    #[test]
    fn near_misses_pass_the_threshold() {
        // One substitution over length 5, with no containment either way.
        let matched = score("carts", "cargs", DEFAULT_THRESHOLD).expect("above threshold");
        assert!((matched - 0.8).abs() < 1e-9);
    }

    #[test]
    fn duplicates_collapse_keeping_max_score() {
        let ranked = rank_default("cat", &["cattle", "cattle"]);
        assert_eq!(ranked, vec!["cattle"]);
    }
}
