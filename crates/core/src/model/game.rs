use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{GameId, UserId};

/// Minimum length of a quiz topic, after trimming.
pub const MIN_TOPIC_LEN: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameError {
    #[error("topic must be at least {MIN_TOPIC_LEN} characters long")]
    TopicTooShort,

    #[error("game is already finished")]
    AlreadyFinished,

    #[error("finished_at is before started_at")]
    InvalidTimeRange,
}

//
// ─── GAME KIND ─────────────────────────────────────────────────────────────────
//

/// The question style of a game, fixed at creation.
///
/// The kind selects the grading path (exact match vs. fuzzy similarity) and
/// the accuracy formula for every question the game owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Mcq,
    OpenEnded,
}

impl GameKind {
    /// Storage/wire representation of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GameKind::Mcq => "mcq",
            GameKind::OpenEnded => "open_ended",
        }
    }

    /// Parses the storage/wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mcq" => Some(GameKind::Mcq),
            "open_ended" => Some(GameKind::OpenEnded),
            _ => None,
        }
    }
}

//
// ─── GAME ──────────────────────────────────────────────────────────────────────
//

/// One instance of a generated quiz a user plays through.
///
/// A game is created atomically with its questions and never mutated
/// afterwards, except for the `finished_at` stamp set when the play-through
/// completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    id: GameId,
    user_id: UserId,
    kind: GameKind,
    topic: String,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Creates a new game.
    ///
    /// # Errors
    ///
    /// Returns `GameError::TopicTooShort` if the trimmed topic is shorter
    /// than [`MIN_TOPIC_LEN`] characters.
    pub fn new(
        id: GameId,
        user_id: UserId,
        kind: GameKind,
        topic: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        let topic = topic.into().trim().to_owned();
        if topic.chars().count() < MIN_TOPIC_LEN {
            return Err(GameError::TopicTooShort);
        }

        Ok(Self {
            id,
            user_id,
            kind,
            topic,
            started_at,
            finished_at: None,
        })
    }

    /// Rehydrates a game from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `GameError::TopicTooShort` for an invalid topic and
    /// `GameError::InvalidTimeRange` if `finished_at` precedes `started_at`.
    pub fn from_persisted(
        id: GameId,
        user_id: UserId,
        kind: GameKind,
        topic: impl Into<String>,
        started_at: DateTime<Utc>,
        finished_at: Option<DateTime<Utc>>,
    ) -> Result<Self, GameError> {
        if let Some(at) = finished_at {
            if at < started_at {
                return Err(GameError::InvalidTimeRange);
            }
        }
        let mut game = Self::new(id, user_id, kind, topic, started_at)?;
        game.finished_at = finished_at;
        Ok(game)
    }

    /// Stamps the game as finished.
    ///
    /// # Errors
    ///
    /// Returns `GameError::AlreadyFinished` if the game already carries a
    /// finish timestamp, or `GameError::InvalidTimeRange` for a timestamp
    /// before the start.
    pub fn finish(&mut self, at: DateTime<Utc>) -> Result<(), GameError> {
        if self.finished_at.is_some() {
            return Err(GameError::AlreadyFinished);
        }
        if at < self.started_at {
            return Err(GameError::InvalidTimeRange);
        }
        self.finished_at = Some(at);
        Ok(())
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &GameId {
        &self.id
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn kind(&self) -> GameKind {
        self.kind
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn build_game(topic: &str) -> Result<Game, GameError> {
        Game::new(
            GameId::new("g1"),
            UserId::new("u1"),
            GameKind::Mcq,
            topic,
            fixed_now(),
        )
    }

    #[test]
    fn rejects_short_topic() {
        assert_eq!(build_game("js").unwrap_err(), GameError::TopicTooShort);
    }

    #[test]
    fn trims_topic_before_validating() {
        assert_eq!(build_game("  ab  ").unwrap_err(), GameError::TopicTooShort);
        let game = build_game("  Rust  ").unwrap();
        assert_eq!(game.topic(), "Rust");
    }

    #[test]
    fn finish_stamps_once() {
        let mut game = build_game("History").unwrap();
        assert!(!game.is_finished());
        game.finish(fixed_now()).unwrap();
        assert!(game.is_finished());
        assert_eq!(
            game.finish(fixed_now()).unwrap_err(),
            GameError::AlreadyFinished
        );
    }

    #[test]
    fn finish_rejects_time_before_start() {
        let mut game = build_game("History").unwrap();
        let earlier = fixed_now() - chrono::Duration::seconds(1);
        assert_eq!(game.finish(earlier).unwrap_err(), GameError::InvalidTimeRange);
    }

    #[test]
    fn from_persisted_validates_time_range() {
        let earlier = fixed_now() - chrono::Duration::seconds(1);
        let err = Game::from_persisted(
            GameId::new("g1"),
            UserId::new("u1"),
            GameKind::OpenEnded,
            "History",
            fixed_now(),
            Some(earlier),
        )
        .unwrap_err();
        assert_eq!(err, GameError::InvalidTimeRange);
    }

    #[test]
    fn kind_round_trips_through_str() {
        assert_eq!(GameKind::parse(GameKind::Mcq.as_str()), Some(GameKind::Mcq));
        assert_eq!(
            GameKind::parse(GameKind::OpenEnded.as_str()),
            Some(GameKind::OpenEnded)
        );
        assert_eq!(GameKind::parse("trivia"), None);
    }
}
