//! Textual similarity used to grade free-text answers.
//!
//! The scorer is a Dice coefficient over character bigrams of the
//! normalized inputs (lowercased, whitespace stripped). It is deterministic,
//! symmetric, and bounded to `[0, 1]`: identical strings score 1.0 and
//! strings sharing no bigrams score 0.0.

use std::collections::HashMap;

/// Computes a similarity ratio in `[0, 1]` between two strings.
#[must_use]
pub fn similarity_ratio(first: &str, second: &str) -> f64 {
    let first = normalize(first);
    let second = normalize(second);

    if first == second {
        return 1.0;
    }
    // A single character has no bigrams to compare against.
    if first.chars().count() < 2 || second.chars().count() < 2 {
        return 0.0;
    }

    let first_bigrams = bigram_counts(&first);
    let second_bigrams = bigram_counts(&second);

    let total: usize = first_bigrams.values().sum::<usize>() + second_bigrams.values().sum::<usize>();
    let mut shared = 0usize;
    for (bigram, count) in &first_bigrams {
        if let Some(other) = second_bigrams.get(bigram) {
            shared += count.min(other);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let ratio = (2 * shared) as f64 / total as f64;
    ratio
}

/// Exposes a similarity ratio as a whole-number percentage in `[0, 100]`.
#[must_use]
pub fn similarity_percentage(first: &str, second: &str) -> f64 {
    (similarity_ratio(first, second) * 100.0).round()
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn bigram_counts(s: &str) -> HashMap<(char, char), usize> {
    let chars: Vec<char> = s.chars().collect();
    let mut counts = HashMap::with_capacity(chars.len().saturating_sub(1));
    for pair in chars.windows(2) {
        *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert!((similarity_ratio("photosynthesis", "photosynthesis") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn normalization_ignores_case_and_whitespace() {
        assert!((similarity_ratio(" Paris ", "paris") - 1.0).abs() < f64::EPSILON);
        assert!((similarity_percentage("New  York", "new york") - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert!(similarity_ratio("abcd", "wxyz").abs() < f64::EPSILON);
    }

    #[test]
    fn symmetric() {
        let a = "chlorophyll absorbs light";
        let b = "light is absorbed by chlorophyll";
        assert!((similarity_ratio(a, b) - similarity_ratio(b, a)).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_overlap_scores_between_bounds() {
        let score = similarity_ratio("mitochondria", "mitochondrion");
        assert!(score > 0.0 && score < 1.0);
    }

    #[test]
    fn more_shared_substrings_score_higher() {
        let close = similarity_ratio("carbon dioxide", "carbon monoxide");
        let far = similarity_ratio("carbon dioxide", "nitrogen");
        assert!(close > far);
    }

    #[test]
    fn single_character_inputs_score_zero_unless_equal() {
        assert!(similarity_ratio("a", "ab").abs() < f64::EPSILON);
        assert!((similarity_ratio("a", "A") - 1.0).abs() < f64::EPSILON);
    }
}
