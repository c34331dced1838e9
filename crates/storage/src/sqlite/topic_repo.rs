use quiz_core::model::TopicCount;
use sqlx::Row;

use super::{SqliteRepository, mapping::map_topic_row};
use crate::repository::{StorageError, TopicCountRepository};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl TopicCountRepository for SqliteRepository {
    async fn get_count(&self, topic: &str) -> Result<Option<u64>, StorageError> {
        let row = sqlx::query("SELECT count FROM topic_counts WHERE topic = ?1")
            .bind(topic)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|row| {
            let count: i64 = row
                .try_get("count")
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            u64::try_from(count)
                .map_err(|_| StorageError::Serialization(format!("invalid count: {count}")))
        })
        .transpose()
    }

    async fn top_topics(&self, limit: u32) -> Result<Vec<TopicCount>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT topic, count
            FROM topic_counts
            ORDER BY count DESC, topic ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut topics = Vec::with_capacity(rows.len());
        for row in rows {
            topics.push(map_topic_row(&row)?);
        }
        Ok(topics)
    }
}
