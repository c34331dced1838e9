//! Composition root wiring storage and services together.

use std::sync::Arc;

use quiz_core::Clock;
use storage::repository::Storage;

use crate::answer_service::AnswerService;
use crate::error::AppServicesError;
use crate::game_service::GameService;
use crate::generation::{OpenAiQuestionGenerator, QuestionGenerator};
use crate::stats_service::StatsService;
use crate::topics_service::TopicsService;

/// Shared bundle of application services.
///
/// Built once at startup and cloned wherever a handler needs it; all services
/// sit behind `Arc` so clones are cheap.
#[derive(Clone)]
pub struct AppServices {
    games: Arc<GameService>,
    answers: Arc<AnswerService>,
    stats: Arc<StatsService>,
    topics: Arc<TopicsService>,
}

impl AppServices {
    /// Wires services over SQLite storage, with the generation client
    /// configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or
    /// migrated.
    pub async fn new_sqlite(database_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(database_url).await?;
        let generator = Arc::new(OpenAiQuestionGenerator::from_env());
        Ok(Self::with_storage(storage, generator, clock))
    }

    /// Wires services over any storage backend and generator. Used by tests
    /// with in-memory storage and a fake generator.
    #[must_use]
    pub fn with_storage(
        storage: Storage,
        generator: Arc<dyn QuestionGenerator>,
        clock: Clock,
    ) -> Self {
        let games = Arc::new(GameService::new(
            clock,
            Arc::clone(&storage.games),
            generator,
        ));
        let answers = Arc::new(AnswerService::new(Arc::clone(&storage.questions)));
        let stats = Arc::new(StatsService::new(Arc::clone(&storage.games)));
        let topics = Arc::new(TopicsService::new(Arc::clone(&storage.topics)));
        Self {
            games,
            answers,
            stats,
            topics,
        }
    }

    #[must_use]
    pub fn games(&self) -> Arc<GameService> {
        Arc::clone(&self.games)
    }

    #[must_use]
    pub fn answers(&self) -> Arc<AnswerService> {
        Arc::clone(&self.answers)
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsService> {
        Arc::clone(&self.stats)
    }

    #[must_use]
    pub fn topics(&self) -> Arc<TopicsService> {
        Arc::clone(&self.topics)
    }
}
