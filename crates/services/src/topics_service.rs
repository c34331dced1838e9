//! Topic popularity reads.

use std::sync::Arc;

use quiz_core::model::TopicCount;
use storage::repository::TopicCountRepository;

use crate::error::TopicsError;

/// Serves popularity counters maintained during game creation.
pub struct TopicsService {
    topics: Arc<dyn TopicCountRepository>,
}

impl TopicsService {
    #[must_use]
    pub fn new(topics: Arc<dyn TopicCountRepository>) -> Self {
        Self { topics }
    }

    /// Most-played topics, highest count first.
    ///
    /// # Errors
    ///
    /// Returns `TopicsError` on storage failure.
    pub async fn trending(&self, limit: u32) -> Result<Vec<TopicCount>, TopicsError> {
        Ok(self.topics.top_topics(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Game, GameId, GameKind, UserId};
    use quiz_core::time::fixed_now;
    use storage::repository::{GameRepository, Storage};

    #[tokio::test]
    async fn trending_orders_by_count() {
        let storage = Storage::in_memory();
        let plays = [("History", 3), ("Biology", 1), ("Chemistry", 2)];
        let mut n = 0;
        for (topic, count) in plays {
            for _ in 0..count {
                let game = Game::new(
                    GameId::new(format!("g{n}")),
                    UserId::new("u1"),
                    GameKind::Mcq,
                    topic,
                    fixed_now(),
                )
                .unwrap();
                n += 1;
                let mut uow = storage.games.begin_creation().await.unwrap();
                uow.insert_game(&game).await.unwrap();
                uow.bump_topic_count(topic).await.unwrap();
                uow.commit().await.unwrap();
            }
        }

        let svc = TopicsService::new(Arc::clone(&storage.topics));
        let trending = svc.trending(2).await.unwrap();
        assert_eq!(
            trending,
            vec![TopicCount::new("History", 3), TopicCount::new("Chemistry", 2)]
        );
    }
}
