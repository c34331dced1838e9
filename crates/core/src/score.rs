//! End-of-game accuracy aggregation.
//!
//! Accuracy is computed differently per game kind: multiple choice counts
//! correct answers, open ended averages the per-question similarity
//! percentages. A game with no questions scores 0.0 rather than NaN.

use crate::model::{GameKind, Question};

/// Rounds a value to two decimal places.
#[must_use]
pub fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes the final accuracy percentage for a completed set of questions.
///
/// Multiple choice: `100 * correct / total`. Open ended: plain mean of each
/// question's `percentage_correct`, with unset treated as 0. The result is
/// rounded to two decimal places; an empty question list yields 0.0.
#[must_use]
pub fn accuracy(kind: GameKind, questions: &[Question]) -> f64 {
    if questions.is_empty() {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let total = questions.len() as f64;

    let raw = match kind {
        GameKind::Mcq => {
            let correct = questions
                .iter()
                .filter(|q| q.is_correct() == Some(true))
                .count();
            #[allow(clippy::cast_precision_loss)]
            let correct = correct as f64;
            100.0 * correct / total
        }
        GameKind::OpenEnded => {
            let sum: f64 = questions
                .iter()
                .map(|q| q.percentage_correct().unwrap_or(0.0))
                .sum();
            sum / total
        }
    };

    round_two(raw)
}
