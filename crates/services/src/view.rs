//! Read models handed to players mid-game.
//!
//! Built from storage rows, these carry only what a player may see while the
//! game is still running. Correct answers never appear here; they are only
//! exposed through `StatsService` once the caller asks for results.

use chrono::{DateTime, Utc};
use quiz_core::model::{GameId, GameKind, QuestionId};
use storage::repository::GameWithQuestions;

/// Redacted projection of one game and its questions in play order.
#[derive(Debug, Clone, PartialEq)]
pub struct GameView {
    pub id: GameId,
    pub kind: GameKind,
    pub topic: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub questions: Vec<QuestionView>,
}

/// One question as shown to the player: prompt and, for multiple choice, the
/// shuffled options. Never the correct answer.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Option<Vec<String>>,
}

impl GameView {
    #[must_use]
    pub fn from_stored(stored: GameWithQuestions) -> Self {
        let GameWithQuestions { game, questions } = stored;
        let questions = questions
            .into_iter()
            .map(|q| QuestionView {
                id: q.id().clone(),
                prompt: q.prompt().to_owned(),
                options: q.options().map(<[String]>::to_vec),
            })
            .collect();
        Self {
            id: game.id().clone(),
            kind: game.kind(),
            topic: game.topic().to_owned(),
            started_at: game.started_at(),
            finished_at: game.finished_at(),
            questions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Game, Question, UserId};
    use quiz_core::time::fixed_now;

    #[test]
    fn view_never_carries_correct_answers() {
        let game = Game::new(
            GameId::new("g1"),
            UserId::new("u1"),
            GameKind::Mcq,
            "Geography",
            fixed_now(),
        )
        .unwrap();
        let question = Question::multiple_choice(
            QuestionId::new("q1"),
            GameId::new("g1"),
            "Capital of France?",
            "Paris",
            vec!["Paris".into(), "London".into(), "Berlin".into(), "Madrid".into()],
        )
        .unwrap();

        let view = GameView::from_stored(GameWithQuestions {
            game,
            questions: vec![question],
        });

        assert_eq!(view.questions.len(), 1);
        assert_eq!(view.questions[0].prompt, "Capital of France?");
        // Options include the answer among distractors, but nothing marks it.
        assert_eq!(view.questions[0].options.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn open_ended_view_has_no_options() {
        let game = Game::new(
            GameId::new("g1"),
            UserId::new("u1"),
            GameKind::OpenEnded,
            "Geography",
            fixed_now(),
        )
        .unwrap();
        let question = Question::open_ended(
            QuestionId::new("q1"),
            GameId::new("g1"),
            "Why is the sky blue?",
            "Rayleigh scattering",
        )
        .unwrap();

        let view = GameView::from_stored(GameWithQuestions {
            game,
            questions: vec![question],
        });
        assert_eq!(view.questions[0].options, None);
    }
}
