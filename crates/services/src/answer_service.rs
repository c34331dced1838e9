//! Answer submission and grading.

use std::sync::Arc;

use quiz_core::model::{GameKind, QuestionId};
use quiz_core::similarity::similarity_percentage;
use storage::repository::{GradeRecord, QuestionRepository, StorageError};

use crate::error::AnswerError;

/// Outcome of grading one submitted answer.
///
/// Exactly one of the two result fields is set, matching the question kind.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerCheck {
    pub is_correct: Option<bool>,
    pub percentage_similar: Option<f64>,
    pub message: String,
}

/// Grades submitted answers and persists the result.
///
/// Each submission is graded and written independently; resubmitting for the
/// same question overwrites the previous result.
pub struct AnswerService {
    questions: Arc<dyn QuestionRepository>,
}

impl AnswerService {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>) -> Self {
        Self { questions }
    }

    /// Grades `user_answer` against the stored question and persists the
    /// grade.
    ///
    /// Multiple choice is exact match after trimming and lowercasing; open
    /// ended is a similarity percentage against the reference answer.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::QuestionNotFound` for an unknown question id.
    pub async fn check_answer(
        &self,
        question_id: &QuestionId,
        user_answer: &str,
    ) -> Result<AnswerCheck, AnswerError> {
        let question = match self.questions.get_question(question_id).await {
            Ok(question) => question,
            Err(StorageError::NotFound) => return Err(AnswerError::QuestionNotFound),
            Err(e) => return Err(e.into()),
        };

        let (grade, check) = match question.kind() {
            GameKind::Mcq => {
                let is_correct = answers_match(user_answer, question.answer());
                (
                    GradeRecord::Mcq { is_correct },
                    AnswerCheck {
                        is_correct: Some(is_correct),
                        percentage_similar: None,
                        message: "Answer evaluated".to_owned(),
                    },
                )
            }
            GameKind::OpenEnded => {
                let percentage = similarity_percentage(user_answer, question.answer());
                (
                    GradeRecord::OpenEnded {
                        percentage_correct: percentage,
                    },
                    AnswerCheck {
                        is_correct: None,
                        percentage_similar: Some(percentage),
                        message: "Answer recorded".to_owned(),
                    },
                )
            }
        };

        self.questions
            .record_grade(question_id, user_answer, grade)
            .await?;
        Ok(check)
    }
}

/// Case-insensitive comparison after trimming surrounding whitespace.
fn answers_match(submitted: &str, reference: &str) -> bool {
    submitted.trim().to_lowercase() == reference.trim().to_lowercase()
}
