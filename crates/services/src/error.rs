//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{GameError, QuestionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// User-facing message for an aborted game creation.
///
/// Generation and transaction failures collapse into this one message; the
/// full internal detail stays in server-side logs.
pub const CREATION_FAILED_MESSAGE: &str =
    "Question generation took too long. Please try fewer questions.";

/// Errors emitted by the question generation client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("question generation is not configured")]
    Disabled,
    #[error("generation provider returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("generation payload is invalid: {0}")]
    InvalidPayload(String),
    #[error("no questions were generated")]
    Empty,
    #[error("generation call timed out")]
    TimedOut,
}

/// Errors emitted by `GameService::create_game`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CreateGameError {
    #[error("amount must be between 1 and 10, got {amount}")]
    InvalidAmount { amount: u8 },
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("game creation exceeded its time budget")]
    TimedOut,
}

impl CreateGameError {
    /// True for malformed input the caller can fix; such errors are reported
    /// with field-level detail and never collapsed into the generic message.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CreateGameError::InvalidAmount { .. } | CreateGameError::Game(_)
        )
    }

    /// The message shown to the caller.
    ///
    /// Validation errors keep their detail; everything else (provider
    /// failure, storage failure, timeout) becomes one retry-advice string.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_validation() {
            self.to_string()
        } else {
            CREATION_FAILED_MESSAGE.to_owned()
        }
    }
}

/// Errors emitted by `AnswerService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("question not found")]
    QuestionNotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `GameService` reads and finish.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameServiceError {
    #[error("game not found")]
    GameNotFound,
    #[error("game is already finished")]
    AlreadyFinished,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsError {
    #[error("game not found")]
    GameNotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `TopicsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TopicsError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the identity boundary.
///
/// Deliberately carries no detail about why the lookup failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthError {
    #[error("you must be logged in")]
    Unauthenticated,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
