use async_trait::async_trait;
use quiz_core::model::{Game, Question};
use sqlx::{Sqlite, Transaction};

use super::mapping::options_to_json;
use crate::repository::{GameCreation, StorageError};

/// SQLite-backed unit of work for game creation.
///
/// Wraps a single transaction; dropping without `commit` rolls back.
pub(crate) struct SqliteGameCreation {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteGameCreation {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl GameCreation for SqliteGameCreation {
    async fn insert_game(&mut self, game: &Game) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO games (id, user_id, kind, topic, started_at, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(game.id().as_str())
        .bind(game.user_id().as_str())
        .bind(game.kind().as_str())
        .bind(game.topic())
        .bind(game.started_at())
        .bind(game.finished_at())
        .execute(&mut *self.tx)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn bump_topic_count(&mut self, topic: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO topic_counts (topic, count)
            VALUES (?1, 1)
            ON CONFLICT(topic) DO UPDATE SET count = count + 1
            ",
        )
        .bind(topic)
        .execute(&mut *self.tx)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn insert_questions(&mut self, questions: &[Question]) -> Result<(), StorageError> {
        if questions.is_empty() {
            return Ok(());
        }

        // One multi-row insert per batch keeps transaction round-trips bounded.
        let mut sql = String::from(
            "INSERT INTO questions (id, game_id, prompt, answer, kind, options) VALUES ",
        );
        for i in 0..questions.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            let base = i * 6;
            sql.push_str(&format!(
                "(?{}, ?{}, ?{}, ?{}, ?{}, ?{})",
                base + 1,
                base + 2,
                base + 3,
                base + 4,
                base + 5,
                base + 6
            ));
        }

        let mut query = sqlx::query(&sql);
        for question in questions {
            let options = question
                .options()
                .map(options_to_json)
                .transpose()?;
            query = query
                .bind(question.id().as_str().to_owned())
                .bind(question.game_id().as_str().to_owned())
                .bind(question.prompt().to_owned())
                .bind(question.answer().to_owned())
                .bind(question.kind().as_str())
                .bind(options);
        }

        query.execute(&mut *self.tx).await.map_err(conn)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        self.tx.commit().await.map_err(conn)
    }
}
