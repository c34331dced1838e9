use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{Game, GameId, Question, QuestionId, TopicCount, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A grading result to persist onto a question, tagged by kind so a grade can
/// never land on the wrong field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradeRecord {
    Mcq { is_correct: bool },
    OpenEnded { percentage_correct: f64 },
}

/// A game together with its questions in play order.
#[derive(Debug, Clone, PartialEq)]
pub struct GameWithQuestions {
    pub game: Game,
    pub questions: Vec<Question>,
}

/// Unit of work for atomic game creation.
///
/// All writes stay invisible to readers until `commit`; dropping the value
/// without committing rolls everything back. The creation orchestrator holds
/// this open across the outbound generation call, which is why the whole
/// sequence is one transaction.
#[async_trait]
pub trait GameCreation: Send {
    /// Stage the new game row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write cannot be staged.
    async fn insert_game(&mut self, game: &Game) -> Result<(), StorageError>;

    /// Create the topic counter at 1 or increment an existing one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the upsert cannot be staged.
    async fn bump_topic_count(&mut self, topic: &str) -> Result<(), StorageError>;

    /// Stage a batch of questions for the new game.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the batch cannot be staged.
    async fn insert_questions(&mut self, questions: &[Question]) -> Result<(), StorageError>;

    /// Make all staged writes visible atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the transaction fails to commit.
    async fn commit(self: Box<Self>) -> Result<(), StorageError>;
}

/// Repository contract for games.
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Open a unit of work for atomic game creation.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if transactional resources cannot be acquired.
    async fn begin_creation(&self) -> Result<Box<dyn GameCreation>, StorageError>;

    /// Fetch a game by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_game(&self, id: &GameId) -> Result<Game, StorageError>;

    /// Fetch a game and its questions in play order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the game is missing.
    async fn get_game_with_questions(
        &self,
        id: &GameId,
    ) -> Result<GameWithQuestions, StorageError>;

    /// Stamp the game as finished.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown game and
    /// `StorageError::Conflict` if it is already finished.
    async fn mark_finished(
        &self,
        id: &GameId,
        finished_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// List a user's games, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn list_games_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Game>, StorageError>;
}

/// Repository contract for single-question reads and grading writes.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Fetch a question by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn get_question(&self, id: &QuestionId) -> Result<Question, StorageError>;

    /// Persist a grading result as one atomic update.
    ///
    /// Repeated calls overwrite the previous result (last write wins).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown question and
    /// `StorageError::Serialization` if the grade does not match the
    /// question kind.
    async fn record_grade(
        &self,
        id: &QuestionId,
        user_answer: &str,
        grade: GradeRecord,
    ) -> Result<(), StorageError>;
}

/// Repository contract for topic popularity counters.
#[async_trait]
pub trait TopicCountRepository: Send + Sync {
    /// Current counter value for a topic, if any game was created for it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn get_count(&self, topic: &str) -> Result<Option<u64>, StorageError>;

    /// Most popular topics, highest count first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn top_topics(&self, limit: u32) -> Result<Vec<TopicCount>, StorageError>;
}

//
// ─── IN-MEMORY IMPLEMENTATION ──────────────────────────────────────────────────
//

#[derive(Default)]
struct InMemoryState {
    games: HashMap<GameId, Game>,
    questions: HashMap<QuestionId, Question>,
    question_order: HashMap<GameId, Vec<QuestionId>>,
    topic_counts: HashMap<String, u64>,
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// The unit of work buffers writes and applies them under one lock on commit,
/// so rollback semantics match the SQLite adapter: nothing staged is visible
/// until `commit`.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    inner: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

struct InMemoryGameCreation {
    inner: Arc<Mutex<InMemoryState>>,
    game: Option<Game>,
    topic: Option<String>,
    questions: Vec<Question>,
}

#[async_trait]
impl GameCreation for InMemoryGameCreation {
    async fn insert_game(&mut self, game: &Game) -> Result<(), StorageError> {
        self.game = Some(game.clone());
        Ok(())
    }

    async fn bump_topic_count(&mut self, topic: &str) -> Result<(), StorageError> {
        self.topic = Some(topic.to_owned());
        Ok(())
    }

    async fn insert_questions(&mut self, questions: &[Question]) -> Result<(), StorageError> {
        self.questions.extend_from_slice(questions);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        let mut state = self
            .inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if let Some(game) = self.game {
            if state.games.contains_key(game.id()) {
                return Err(StorageError::Conflict);
            }
            let game_id = game.id().clone();
            state.games.insert(game_id.clone(), game);
            let order: Vec<QuestionId> =
                self.questions.iter().map(|q| q.id().clone()).collect();
            state.question_order.insert(game_id, order);
            for question in self.questions {
                state.questions.insert(question.id().clone(), question);
            }
        }

        if let Some(topic) = self.topic {
            *state.topic_counts.entry(topic).or_insert(0) += 1;
        }

        Ok(())
    }
}

#[async_trait]
impl GameRepository for InMemoryRepository {
    async fn begin_creation(&self) -> Result<Box<dyn GameCreation>, StorageError> {
        Ok(Box::new(InMemoryGameCreation {
            inner: Arc::clone(&self.inner),
            game: None,
            topic: None,
            questions: Vec::new(),
        }))
    }

    async fn get_game(&self, id: &GameId) -> Result<Game, StorageError> {
        let state = self.lock()?;
        state.games.get(id).cloned().ok_or(StorageError::NotFound)
    }

    async fn get_game_with_questions(
        &self,
        id: &GameId,
    ) -> Result<GameWithQuestions, StorageError> {
        let state = self.lock()?;
        let game = state.games.get(id).cloned().ok_or(StorageError::NotFound)?;
        let order = state.question_order.get(id).cloned().unwrap_or_default();
        let mut questions = Vec::with_capacity(order.len());
        for question_id in &order {
            let question = state
                .questions
                .get(question_id)
                .cloned()
                .ok_or(StorageError::NotFound)?;
            questions.push(question);
        }
        Ok(GameWithQuestions { game, questions })
    }

    async fn mark_finished(
        &self,
        id: &GameId,
        finished_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let game = state.games.get_mut(id).ok_or(StorageError::NotFound)?;
        game.finish(finished_at).map_err(|_| StorageError::Conflict)
    }

    async fn list_games_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Game>, StorageError> {
        let state = self.lock()?;
        let mut games: Vec<Game> = state
            .games
            .values()
            .filter(|g| g.user_id() == user_id)
            .cloned()
            .collect();
        games.sort_by(|a, b| b.started_at().cmp(&a.started_at()));
        games.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(games)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn get_question(&self, id: &QuestionId) -> Result<Question, StorageError> {
        let state = self.lock()?;
        state
            .questions
            .get(id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn record_grade(
        &self,
        id: &QuestionId,
        user_answer: &str,
        grade: GradeRecord,
    ) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let question = state.questions.get_mut(id).ok_or(StorageError::NotFound)?;
        match grade {
            GradeRecord::Mcq { is_correct } => question
                .record_mcq_grade(user_answer, is_correct)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            GradeRecord::OpenEnded { percentage_correct } => question
                .record_open_ended_grade(user_answer, percentage_correct)
                .map_err(|e| StorageError::Serialization(e.to_string())),
        }
    }
}

#[async_trait]
impl TopicCountRepository for InMemoryRepository {
    async fn get_count(&self, topic: &str) -> Result<Option<u64>, StorageError> {
        let state = self.lock()?;
        Ok(state.topic_counts.get(topic).copied())
    }

    async fn top_topics(&self, limit: u32) -> Result<Vec<TopicCount>, StorageError> {
        let state = self.lock()?;
        let mut topics: Vec<TopicCount> = state
            .topic_counts
            .iter()
            .map(|(topic, count)| TopicCount::new(topic.clone(), *count))
            .collect();
        topics.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.topic.cmp(&b.topic)));
        topics.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(topics)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub games: Arc<dyn GameRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub topics: Arc<dyn TopicCountRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let games: Arc<dyn GameRepository> = Arc::new(repo.clone());
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo.clone());
        let topics: Arc<dyn TopicCountRepository> = Arc::new(repo);
        Self {
            games,
            questions,
            topics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::GameKind;
    use quiz_core::time::fixed_now;

    fn build_game(id: &str, topic: &str) -> Game {
        Game::new(
            GameId::new(id),
            UserId::new("u1"),
            GameKind::OpenEnded,
            topic,
            fixed_now(),
        )
        .unwrap()
    }

    fn build_question(id: &str, game_id: &GameId) -> Question {
        Question::open_ended(QuestionId::new(id), game_id.clone(), "Why?", "Because").unwrap()
    }

    #[tokio::test]
    async fn creation_commit_makes_everything_visible() {
        let repo = InMemoryRepository::new();
        let game = build_game("g1", "Biology");
        let questions = vec![build_question("q1", game.id()), build_question("q2", game.id())];

        let mut uow = repo.begin_creation().await.unwrap();
        uow.insert_game(&game).await.unwrap();
        uow.bump_topic_count(game.topic()).await.unwrap();
        uow.insert_questions(&questions).await.unwrap();
        uow.commit().await.unwrap();

        let stored = repo.get_game_with_questions(game.id()).await.unwrap();
        assert_eq!(stored.questions.len(), 2);
        assert_eq!(stored.questions[0].id(), &QuestionId::new("q1"));
        assert_eq!(repo.get_count("Biology").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn creation_drop_without_commit_leaves_no_state() {
        let repo = InMemoryRepository::new();
        let game = build_game("g1", "Biology");

        {
            let mut uow = repo.begin_creation().await.unwrap();
            uow.insert_game(&game).await.unwrap();
            uow.bump_topic_count(game.topic()).await.unwrap();
            // dropped here, never committed
        }

        assert!(matches!(
            repo.get_game(game.id()).await,
            Err(StorageError::NotFound)
        ));
        assert_eq!(repo.get_count("Biology").await.unwrap(), None);
    }

    #[tokio::test]
    async fn topic_count_increments_per_commit() {
        let repo = InMemoryRepository::new();
        for i in 0..3 {
            let game = build_game(&format!("g{i}"), "History");
            let mut uow = repo.begin_creation().await.unwrap();
            uow.insert_game(&game).await.unwrap();
            uow.bump_topic_count(game.topic()).await.unwrap();
            uow.commit().await.unwrap();
        }
        assert_eq!(repo.get_count("History").await.unwrap(), Some(3));

        let top = repo.top_topics(10).await.unwrap();
        assert_eq!(top, vec![TopicCount::new("History", 3)]);
    }

    #[tokio::test]
    async fn record_grade_overwrites_previous_result() {
        let repo = InMemoryRepository::new();
        let game = build_game("g1", "Biology");
        let question = build_question("q1", game.id());

        let mut uow = repo.begin_creation().await.unwrap();
        uow.insert_game(&game).await.unwrap();
        uow.insert_questions(std::slice::from_ref(&question)).await.unwrap();
        uow.commit().await.unwrap();

        repo.record_grade(
            question.id(),
            "first",
            GradeRecord::OpenEnded {
                percentage_correct: 10.0,
            },
        )
        .await
        .unwrap();
        repo.record_grade(
            question.id(),
            "second",
            GradeRecord::OpenEnded {
                percentage_correct: 80.0,
            },
        )
        .await
        .unwrap();

        let stored = repo.get_question(question.id()).await.unwrap();
        assert_eq!(stored.user_answer(), Some("second"));
        assert_eq!(stored.percentage_correct(), Some(80.0));
    }

    #[tokio::test]
    async fn mark_finished_is_single_shot() {
        let repo = InMemoryRepository::new();
        let game = build_game("g1", "Biology");
        let mut uow = repo.begin_creation().await.unwrap();
        uow.insert_game(&game).await.unwrap();
        uow.commit().await.unwrap();

        repo.mark_finished(game.id(), fixed_now()).await.unwrap();
        assert!(matches!(
            repo.mark_finished(game.id(), fixed_now()).await,
            Err(StorageError::Conflict)
        ));
        assert!(repo.get_game(game.id()).await.unwrap().is_finished());
    }
}
