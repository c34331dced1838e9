//! Game lifecycle: transactional creation, retrieval, and finishing.

use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{Game, GameId, GameKind, Question, QuestionId, UserId};
use quiz_core::Clock;
use rand::seq::SliceRandom;
use storage::repository::{GameRepository, StorageError};

use crate::error::{CreateGameError, GameServiceError, GenerationError};
use crate::generation::{GeneratedQuestion, QuestionGenerator};
use crate::view::GameView;

pub const MIN_AMOUNT: u8 = 1;
pub const MAX_AMOUNT: u8 = 10;

/// Questions are staged in batches of this size inside the creation
/// transaction.
pub const QUESTION_BATCH_SIZE: usize = 5;

/// Budget for the single outbound generation call.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Budget for the whole creation sequence, generation call included.
pub const CREATION_BUDGET: Duration = Duration::from_secs(15);

/// Parameters for a new game.
#[derive(Debug, Clone)]
pub struct CreateGameRequest {
    pub topic: String,
    pub kind: GameKind,
    pub amount: u8,
}

/// Orchestrates game creation and lifecycle transitions.
///
/// Creation is all-or-nothing: the game row, the topic counter bump, and the
/// question batches all ride one unit of work that stays open across the
/// generation call and commits only after every write is staged.
pub struct GameService {
    clock: Clock,
    games: Arc<dyn GameRepository>,
    generator: Arc<dyn QuestionGenerator>,
    generation_timeout: Duration,
    creation_budget: Duration,
}

impl GameService {
    #[must_use]
    pub fn new(
        clock: Clock,
        games: Arc<dyn GameRepository>,
        generator: Arc<dyn QuestionGenerator>,
    ) -> Self {
        Self {
            clock,
            games,
            generator,
            generation_timeout: GENERATION_TIMEOUT,
            creation_budget: CREATION_BUDGET,
        }
    }

    /// Overrides the default time budgets. Intended for tests.
    #[must_use]
    pub fn with_timeouts(
        mut self,
        generation_timeout: Duration,
        creation_budget: Duration,
    ) -> Self {
        self.generation_timeout = generation_timeout;
        self.creation_budget = creation_budget;
        self
    }

    /// Creates a game with freshly generated questions.
    ///
    /// # Errors
    ///
    /// Returns `CreateGameError` for invalid input, generation failure,
    /// storage failure, or an exceeded time budget. On any failure no
    /// partial state is left behind.
    pub async fn create_game(
        &self,
        user_id: &UserId,
        request: CreateGameRequest,
    ) -> Result<GameId, CreateGameError> {
        if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&request.amount) {
            return Err(CreateGameError::InvalidAmount {
                amount: request.amount,
            });
        }

        let result = tokio::time::timeout(
            self.creation_budget,
            self.create_game_inner(user_id, &request),
        )
        .await
        .unwrap_or(Err(CreateGameError::TimedOut));

        if let Err(error) = &result {
            if !error.is_validation() {
                tracing::warn!(
                    topic = %request.topic,
                    kind = %request.kind.as_str(),
                    amount = request.amount,
                    %error,
                    "game creation aborted"
                );
            }
        }
        result
    }

    async fn create_game_inner(
        &self,
        user_id: &UserId,
        request: &CreateGameRequest,
    ) -> Result<GameId, CreateGameError> {
        let game = Game::new(
            GameId::generate(),
            user_id.clone(),
            request.kind,
            request.topic.clone(),
            self.clock.now(),
        )?;
        let game_id = game.id().clone();

        let mut creation = self.games.begin_creation().await?;
        creation.insert_game(&game).await?;
        creation.bump_topic_count(game.topic()).await?;

        // The unit of work stays open across this call; a slow provider
        // cannot leave a committed game without questions.
        let generated = tokio::time::timeout(
            self.generation_timeout,
            self.generator
                .generate(game.topic(), request.kind, request.amount),
        )
        .await
        .map_err(|_| GenerationError::TimedOut)??;

        if generated.is_empty() {
            return Err(GenerationError::Empty.into());
        }
        // Generators must honor the contract regardless of implementation;
        // a committed game carries exactly the requested question count.
        if generated.len() != request.amount as usize {
            return Err(GenerationError::InvalidPayload(format!(
                "expected {} questions, got {}",
                request.amount,
                generated.len()
            ))
            .into());
        }

        let questions = build_questions(&game_id, generated)?;
        for batch in questions.chunks(QUESTION_BATCH_SIZE) {
            creation.insert_questions(batch).await?;
        }
        creation.commit().await?;

        tracing::info!(game_id = %game_id, topic = %game.topic(), "game created");
        Ok(game_id)
    }

    /// Fetches a game as the redacted player view.
    ///
    /// # Errors
    ///
    /// Returns `GameServiceError::GameNotFound` for an unknown id.
    pub async fn get_game(&self, id: &GameId) -> Result<GameView, GameServiceError> {
        match self.games.get_game_with_questions(id).await {
            Ok(stored) => Ok(GameView::from_stored(stored)),
            Err(StorageError::NotFound) => Err(GameServiceError::GameNotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Stamps the game as finished at the current time.
    ///
    /// # Errors
    ///
    /// Returns `GameServiceError::GameNotFound` for an unknown id and
    /// `GameServiceError::AlreadyFinished` if it was finished before.
    pub async fn finish_game(&self, id: &GameId) -> Result<(), GameServiceError> {
        match self.games.mark_finished(id, self.clock.now()).await {
            Ok(()) => Ok(()),
            Err(StorageError::NotFound) => Err(GameServiceError::GameNotFound),
            Err(StorageError::Conflict) => Err(GameServiceError::AlreadyFinished),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists a user's games, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `GameServiceError` on storage failure.
    pub async fn list_games(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Game>, GameServiceError> {
        Ok(self.games.list_games_for_user(user_id, limit).await?)
    }
}

/// Turns generated records into domain questions, shuffling each
/// multiple-choice option list so the correct answer has no fixed position.
fn build_questions(
    game_id: &GameId,
    generated: Vec<GeneratedQuestion>,
) -> Result<Vec<Question>, CreateGameError> {
    let mut rng = rand::rng();
    let mut questions = Vec::with_capacity(generated.len());
    for item in generated {
        let question = match item {
            GeneratedQuestion::Mcq {
                prompt,
                answer,
                distractors,
            } => {
                let mut options: Vec<String> = distractors.into_iter().collect();
                options.push(answer.clone());
                options.shuffle(&mut rng);
                Question::multiple_choice(
                    QuestionId::generate(),
                    game_id.clone(),
                    prompt,
                    answer,
                    options,
                )?
            }
            GeneratedQuestion::OpenEnded { prompt, answer } => {
                Question::open_ended(QuestionId::generate(), game_id.clone(), prompt, answer)?
            }
        };
        questions.push(question);
    }
    Ok(questions)
}
