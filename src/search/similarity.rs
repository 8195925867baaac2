//! Normalized Levenshtein similarity between two strings.

/// Returns a similarity score in `[0, 1]`.
///
/// Classic dynamic-programming edit distance (unit costs for insertion,
/// deletion, and substitution), normalized as `1 - distance / max(len)`.
/// Comparison is case-sensitive; callers lower-case beforehand. Two empty
/// strings score `1.0`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (row, &ch_a) in a.iter().enumerate() {
        current[0] = row + 1;
        for (col, &ch_b) in b.iter().enumerate() {
            let substitution = prev[col] + usize::from(ch_a != ch_b);
            let deletion = prev[col + 1] + 1;
            let insertion = current[col] + 1;
            current[col + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    let distance = prev[b.len()];
    1.0 - distance as f64 / a.len().max(b.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::similarity;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("forum", "forum"), 1.0);
    }

    #[test]
    fn both_empty_scores_one() {
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn empty_against_nonempty_scores_zero() {
        assert_eq!(similarity("", "abc"), 0.0);
        assert_eq!(similarity("abc", ""), 0.0);
    }

    #[test]
    fn symmetric() {
        let pairs = [("kitten", "sitting"), ("rust", "trust"), ("a", "ab")];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }

    #[test]
    fn known_edit_distances() {
        // kitten -> sitting: 3 edits over max length 7.
        assert!((similarity("kitten", "sitting") - (1.0 - 3.0 / 7.0)).abs() < 1e-9);
        // One substitution over length 4.
        assert!((similarity("cart", "card") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn disjoint_strings_score_low() {
        assert!(similarity("abc", "xyz") < 0.01);
    }
}
