use quiz_core::model::{Game, GameId, GameKind, Question, QuestionId, TopicCount, UserId};
use sqlx::Row;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn parse_kind(s: &str) -> Result<GameKind, StorageError> {
    GameKind::parse(s).ok_or_else(|| StorageError::Serialization(format!("invalid kind: {s}")))
}

/// The option list is persisted as an opaque JSON array of strings.
pub(crate) fn options_to_json(options: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(crate) fn options_from_json(raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_game_row(row: &sqlx::sqlite::SqliteRow) -> Result<Game, StorageError> {
    Game::from_persisted(
        GameId::new(row.try_get::<String, _>("id").map_err(ser)?),
        UserId::new(row.try_get::<String, _>("user_id").map_err(ser)?),
        parse_kind(row.try_get::<String, _>("kind").map_err(ser)?.as_str())?,
        row.try_get::<String, _>("topic").map_err(ser)?,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("finished_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let options = row
        .try_get::<Option<String>, _>("options")
        .map_err(ser)?
        .map(|raw| options_from_json(&raw))
        .transpose()?;

    Question::from_persisted(
        QuestionId::new(row.try_get::<String, _>("id").map_err(ser)?),
        GameId::new(row.try_get::<String, _>("game_id").map_err(ser)?),
        row.try_get::<String, _>("prompt").map_err(ser)?,
        row.try_get::<String, _>("answer").map_err(ser)?,
        parse_kind(row.try_get::<String, _>("kind").map_err(ser)?.as_str())?,
        options,
        row.try_get("user_answer").map_err(ser)?,
        row.try_get("is_correct").map_err(ser)?,
        row.try_get("percentage_correct").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_topic_row(row: &sqlx::sqlite::SqliteRow) -> Result<TopicCount, StorageError> {
    let count_i64: i64 = row.try_get("count").map_err(ser)?;
    let count = u64::try_from(count_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid count: {count_i64}")))?;
    Ok(TopicCount::new(
        row.try_get::<String, _>("topic").map_err(ser)?,
        count,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_round_trip_through_json() {
        let options = vec!["a".to_string(), "b".to_string()];
        let raw = options_to_json(&options).unwrap();
        assert_eq!(options_from_json(&raw).unwrap(), options);
    }

    #[test]
    fn invalid_kind_is_a_serialization_error() {
        assert!(matches!(
            parse_kind("trivia"),
            Err(StorageError::Serialization(_))
        ));
    }
}
