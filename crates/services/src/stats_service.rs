//! End-of-game statistics.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::model::{GameId, GameKind, QuestionId};
use quiz_core::score::accuracy;
use storage::repository::{GameRepository, StorageError};

use crate::error::StatsError;

/// Aggregated results for one game, correct answers included.
///
/// This is the post-game surface; unlike `GameView` it reveals the reference
/// answers so the player can review what they got wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct GameStatistics {
    pub game_id: GameId,
    pub kind: GameKind,
    pub topic: String,
    pub finished_at: Option<DateTime<Utc>>,
    /// Overall accuracy in percent, rounded to two decimals. Multiple choice
    /// counts correct answers; open ended averages similarity percentages,
    /// with ungraded questions contributing zero.
    pub accuracy: f64,
    pub questions: Vec<QuestionBreakdown>,
}

/// Per-question review row.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionBreakdown {
    pub id: QuestionId,
    pub prompt: String,
    pub correct_answer: String,
    pub user_answer: Option<String>,
    pub is_correct: Option<bool>,
    pub percentage_correct: Option<f64>,
}

/// Computes end-of-game aggregates from stored grading results.
pub struct StatsService {
    games: Arc<dyn GameRepository>,
}

impl StatsService {
    #[must_use]
    pub fn new(games: Arc<dyn GameRepository>) -> Self {
        Self { games }
    }

    /// Builds the statistics view for one game.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::GameNotFound` for an unknown id.
    pub async fn game_statistics(&self, id: &GameId) -> Result<GameStatistics, StatsError> {
        let stored = match self.games.get_game_with_questions(id).await {
            Ok(stored) => stored,
            Err(StorageError::NotFound) => return Err(StatsError::GameNotFound),
            Err(e) => return Err(e.into()),
        };

        let accuracy = accuracy(stored.game.kind(), &stored.questions);
        let questions = stored
            .questions
            .into_iter()
            .map(|q| QuestionBreakdown {
                id: q.id().clone(),
                prompt: q.prompt().to_owned(),
                correct_answer: q.answer().to_owned(),
                user_answer: q.user_answer().map(str::to_owned),
                is_correct: q.is_correct(),
                percentage_correct: q.percentage_correct(),
            })
            .collect();

        Ok(GameStatistics {
            game_id: stored.game.id().clone(),
            kind: stored.game.kind(),
            topic: stored.game.topic().to_owned(),
            finished_at: stored.game.finished_at(),
            accuracy,
            questions,
        })
    }
}
