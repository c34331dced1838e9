use chrono::{DateTime, Utc};
use quiz_core::model::{Game, GameId, UserId};

use super::unit_of_work::SqliteGameCreation;
use super::{SqliteRepository, mapping::{map_game_row, map_question_row}};
use crate::repository::{GameCreation, GameRepository, GameWithQuestions, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl GameRepository for SqliteRepository {
    async fn begin_creation(&self) -> Result<Box<dyn GameCreation>, StorageError> {
        let tx = self.pool.begin().await.map_err(conn)?;
        Ok(Box::new(SqliteGameCreation::new(tx)))
    }

    async fn get_game(&self, id: &GameId) -> Result<Game, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, kind, topic, started_at, finished_at
            FROM games
            WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_game_row(&row)
    }

    async fn get_game_with_questions(
        &self,
        id: &GameId,
    ) -> Result<GameWithQuestions, StorageError> {
        let game = self.get_game(id).await?;

        // rowid order is insertion order, which is the play order.
        let rows = sqlx::query(
            r"
            SELECT id, game_id, prompt, answer, kind, options,
                   user_answer, is_correct, percentage_correct
            FROM questions
            WHERE game_id = ?1
            ORDER BY rowid ASC
            ",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(map_question_row(&row)?);
        }

        Ok(GameWithQuestions { game, questions })
    }

    async fn mark_finished(
        &self,
        id: &GameId,
        finished_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
            UPDATE games
            SET finished_at = ?2
            WHERE id = ?1 AND finished_at IS NULL
            ",
        )
        .bind(id.as_str())
        .bind(finished_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if result.rows_affected() == 0 {
            // Distinguish an unknown game from one already finished.
            return match self.get_game(id).await {
                Ok(_) => Err(StorageError::Conflict),
                Err(err) => Err(err),
            };
        }

        Ok(())
    }

    async fn list_games_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Game>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, kind, topic, started_at, finished_at
            FROM games
            WHERE user_id = ?1
            ORDER BY started_at DESC, id DESC
            LIMIT ?2
            ",
        )
        .bind(user_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut games = Vec::with_capacity(rows.len());
        for row in rows {
            games.push(map_game_row(&row)?);
        }
        Ok(games)
    }
}
