use thiserror::Error;

use crate::model::game::GameKind;
use crate::model::ids::{GameId, QuestionId};

/// Number of options a multiple-choice question carries
/// (three distractors plus the correct answer).
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question answer cannot be empty")]
    EmptyAnswer,

    #[error("multiple-choice question needs exactly {OPTION_COUNT} options, got {len}")]
    WrongOptionCount { len: usize },

    #[error("multiple-choice options cannot be empty strings")]
    EmptyOption,

    #[error("open-ended question cannot carry options")]
    UnexpectedOptions,

    #[error("grade does not match question kind {kind:?}")]
    GradeKindMismatch { kind: GameKind },

    #[error("percentage must be within 0..=100, got {value}")]
    PercentageOutOfRange { value: f64 },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single question owned by a game.
///
/// The question kind is inherited from the owning game and decides which of
/// the two grading fields is meaningful: `is_correct` for multiple choice,
/// `percentage_correct` for open ended. The other field stays unset for the
/// lifetime of the question.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: QuestionId,
    game_id: GameId,
    prompt: String,
    answer: String,
    kind: GameKind,
    options: Option<Vec<String>>,
    user_answer: Option<String>,
    is_correct: Option<bool>,
    percentage_correct: Option<f64>,
}

impl Question {
    /// Creates an ungraded multiple-choice question.
    ///
    /// `options` is the already shuffled list of [`OPTION_COUNT`] choices.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if prompt, answer, or the option list is
    /// invalid.
    pub fn multiple_choice(
        id: QuestionId,
        game_id: GameId,
        prompt: impl Into<String>,
        answer: impl Into<String>,
        options: Vec<String>,
    ) -> Result<Self, QuestionError> {
        let (prompt, answer) = validate_texts(prompt, answer)?;
        if options.len() != OPTION_COUNT {
            return Err(QuestionError::WrongOptionCount { len: options.len() });
        }
        if options.iter().any(|o| o.trim().is_empty()) {
            return Err(QuestionError::EmptyOption);
        }

        Ok(Self {
            id,
            game_id,
            prompt,
            answer,
            kind: GameKind::Mcq,
            options: Some(options),
            user_answer: None,
            is_correct: None,
            percentage_correct: None,
        })
    }

    /// Creates an ungraded open-ended question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if prompt or answer is empty.
    pub fn open_ended(
        id: QuestionId,
        game_id: GameId,
        prompt: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let (prompt, answer) = validate_texts(prompt, answer)?;
        Ok(Self {
            id,
            game_id,
            prompt,
            answer,
            kind: GameKind::OpenEnded,
            options: None,
            user_answer: None,
            is_correct: None,
            percentage_correct: None,
        })
    }

    /// Rehydrates a question from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the persisted shape violates the per-kind
    /// invariants (options presence, grading field selection).
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: QuestionId,
        game_id: GameId,
        prompt: impl Into<String>,
        answer: impl Into<String>,
        kind: GameKind,
        options: Option<Vec<String>>,
        user_answer: Option<String>,
        is_correct: Option<bool>,
        percentage_correct: Option<f64>,
    ) -> Result<Self, QuestionError> {
        let mut question = match kind {
            GameKind::Mcq => {
                let options = options.ok_or(QuestionError::WrongOptionCount { len: 0 })?;
                Self::multiple_choice(id, game_id, prompt, answer, options)?
            }
            GameKind::OpenEnded => {
                if options.is_some() {
                    return Err(QuestionError::UnexpectedOptions);
                }
                Self::open_ended(id, game_id, prompt, answer)?
            }
        };

        match kind {
            GameKind::Mcq => {
                if percentage_correct.is_some() {
                    return Err(QuestionError::GradeKindMismatch { kind });
                }
                question.user_answer = user_answer;
                question.is_correct = is_correct;
            }
            GameKind::OpenEnded => {
                if is_correct.is_some() {
                    return Err(QuestionError::GradeKindMismatch { kind });
                }
                if let Some(value) = percentage_correct {
                    validate_percentage(value)?;
                }
                question.user_answer = user_answer;
                question.percentage_correct = percentage_correct;
            }
        }

        Ok(question)
    }

    /// Records a multiple-choice grading result, overwriting any previous one.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::GradeKindMismatch` for open-ended questions.
    pub fn record_mcq_grade(
        &mut self,
        user_answer: impl Into<String>,
        is_correct: bool,
    ) -> Result<(), QuestionError> {
        if self.kind != GameKind::Mcq {
            return Err(QuestionError::GradeKindMismatch { kind: self.kind });
        }
        self.user_answer = Some(user_answer.into());
        self.is_correct = Some(is_correct);
        Ok(())
    }

    /// Records an open-ended grading result, overwriting any previous one.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::GradeKindMismatch` for multiple-choice
    /// questions and `QuestionError::PercentageOutOfRange` for a percentage
    /// outside `0..=100`.
    pub fn record_open_ended_grade(
        &mut self,
        user_answer: impl Into<String>,
        percentage_correct: f64,
    ) -> Result<(), QuestionError> {
        if self.kind != GameKind::OpenEnded {
            return Err(QuestionError::GradeKindMismatch { kind: self.kind });
        }
        validate_percentage(percentage_correct)?;
        self.user_answer = Some(user_answer.into());
        self.percentage_correct = Some(percentage_correct);
        Ok(())
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn kind(&self) -> GameKind {
        self.kind
    }

    #[must_use]
    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }

    #[must_use]
    pub fn user_answer(&self) -> Option<&str> {
        self.user_answer.as_deref()
    }

    #[must_use]
    pub fn is_correct(&self) -> Option<bool> {
        self.is_correct
    }

    #[must_use]
    pub fn percentage_correct(&self) -> Option<f64> {
        self.percentage_correct
    }

    /// True once a grading result has been recorded.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.user_answer.is_some()
    }
}

fn validate_texts(
    prompt: impl Into<String>,
    answer: impl Into<String>,
) -> Result<(String, String), QuestionError> {
    let prompt = prompt.into();
    if prompt.trim().is_empty() {
        return Err(QuestionError::EmptyPrompt);
    }
    let answer = answer.into();
    if answer.trim().is_empty() {
        return Err(QuestionError::EmptyAnswer);
    }
    Ok((prompt, answer))
}

fn validate_percentage(value: f64) -> Result<(), QuestionError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(QuestionError::PercentageOutOfRange { value });
    }
    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec![
            "Paris".into(),
            "London".into(),
            "Berlin".into(),
            "Madrid".into(),
        ]
    }

    fn build_mcq() -> Question {
        Question::multiple_choice(
            QuestionId::new("q1"),
            GameId::new("g1"),
            "Capital of France?",
            "Paris",
            options(),
        )
        .unwrap()
    }

    #[test]
    fn mcq_requires_four_options() {
        let err = Question::multiple_choice(
            QuestionId::new("q1"),
            GameId::new("g1"),
            "Capital of France?",
            "Paris",
            vec!["Paris".into(), "London".into()],
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::WrongOptionCount { len: 2 });
    }

    #[test]
    fn rejects_empty_prompt_and_answer() {
        let err = Question::open_ended(QuestionId::new("q"), GameId::new("g"), " ", "a")
            .unwrap_err();
        assert_eq!(err, QuestionError::EmptyPrompt);

        let err = Question::open_ended(QuestionId::new("q"), GameId::new("g"), "p", "  ")
            .unwrap_err();
        assert_eq!(err, QuestionError::EmptyAnswer);
    }

    #[test]
    fn mcq_grade_sets_only_is_correct() {
        let mut q = build_mcq();
        q.record_mcq_grade("Paris", true).unwrap();
        assert_eq!(q.user_answer(), Some("Paris"));
        assert_eq!(q.is_correct(), Some(true));
        assert_eq!(q.percentage_correct(), None);
    }

    #[test]
    fn open_ended_grade_sets_only_percentage() {
        let mut q =
            Question::open_ended(QuestionId::new("q"), GameId::new("g"), "Why?", "Because")
                .unwrap();
        q.record_open_ended_grade("because", 87.0).unwrap();
        assert_eq!(q.percentage_correct(), Some(87.0));
        assert_eq!(q.is_correct(), None);
    }

    #[test]
    fn grade_kind_mismatch_is_rejected() {
        let mut q = build_mcq();
        let err = q.record_open_ended_grade("Paris", 50.0).unwrap_err();
        assert_eq!(err, QuestionError::GradeKindMismatch { kind: GameKind::Mcq });
    }

    #[test]
    fn regrade_overwrites_previous_result() {
        let mut q = build_mcq();
        q.record_mcq_grade("London", false).unwrap();
        q.record_mcq_grade("Paris", true).unwrap();
        assert_eq!(q.user_answer(), Some("Paris"));
        assert_eq!(q.is_correct(), Some(true));
    }

    #[test]
    fn percentage_out_of_range_is_rejected() {
        let mut q =
            Question::open_ended(QuestionId::new("q"), GameId::new("g"), "Why?", "Because")
                .unwrap();
        let err = q.record_open_ended_grade("x", 101.0).unwrap_err();
        assert!(matches!(err, QuestionError::PercentageOutOfRange { .. }));
    }

    #[test]
    fn from_persisted_rejects_cross_kind_grades() {
        let err = Question::from_persisted(
            QuestionId::new("q"),
            GameId::new("g"),
            "p",
            "a",
            GameKind::Mcq,
            Some(options()),
            Some("x".into()),
            None,
            Some(50.0),
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::GradeKindMismatch { kind: GameKind::Mcq });

        let err = Question::from_persisted(
            QuestionId::new("q"),
            GameId::new("g"),
            "p",
            "a",
            GameKind::OpenEnded,
            Some(options()),
            None,
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::UnexpectedOptions);
    }
}
