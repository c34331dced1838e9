use quiz_core::model::{Question, QuestionId};

use super::{SqliteRepository, mapping::map_question_row};
use crate::repository::{GradeRecord, QuestionRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn get_question(&self, id: &QuestionId) -> Result<Question, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, game_id, prompt, answer, kind, options,
                   user_answer, is_correct, percentage_correct
            FROM questions
            WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_question_row(&row)
    }

    async fn record_grade(
        &self,
        id: &QuestionId,
        user_answer: &str,
        grade: GradeRecord,
    ) -> Result<(), StorageError> {
        // One statement per grade keeps the write atomic; the kind column
        // guard rejects a grade aimed at the wrong question kind.
        let result = match grade {
            GradeRecord::Mcq { is_correct } => {
                sqlx::query(
                    r"
                    UPDATE questions
                    SET user_answer = ?2, is_correct = ?3
                    WHERE id = ?1 AND kind = 'mcq'
                    ",
                )
                .bind(id.as_str())
                .bind(user_answer)
                .bind(is_correct)
                .execute(&self.pool)
                .await
                .map_err(conn)?
            }
            GradeRecord::OpenEnded { percentage_correct } => {
                sqlx::query(
                    r"
                    UPDATE questions
                    SET user_answer = ?2, percentage_correct = ?3
                    WHERE id = ?1 AND kind = 'open_ended'
                    ",
                )
                .bind(id.as_str())
                .bind(user_answer)
                .bind(percentage_correct)
                .execute(&self.pool)
                .await
                .map_err(conn)?
            }
        };

        if result.rows_affected() == 0 {
            return match self.get_question(id).await {
                Ok(question) => Err(StorageError::Serialization(format!(
                    "grade does not match question kind {:?}",
                    question.kind()
                ))),
                Err(err) => Err(err),
            };
        }

        Ok(())
    }
}
