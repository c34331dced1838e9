mod game;
mod ids;
mod question;
mod topic;

pub use game::{Game, GameError, GameKind, MIN_TOPIC_LEN};
pub use ids::{GameId, QuestionId, UserId};
pub use question::{OPTION_COUNT, Question, QuestionError};
pub use topic::TopicCount;
