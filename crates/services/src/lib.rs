#![forbid(unsafe_code)]

pub mod answer_service;
pub mod app_services;
pub mod auth;
pub mod error;
pub mod game_service;
pub mod generation;
pub mod stats_service;
pub mod topics_service;
pub mod view;

pub use quiz_core::Clock;

pub use answer_service::{AnswerCheck, AnswerService};
pub use app_services::AppServices;
pub use auth::{IdentityProvider, StaticIdentityProvider};
pub use error::{
    AnswerError, AppServicesError, AuthError, CreateGameError, GameServiceError, GenerationError,
    StatsError, TopicsError,
};
pub use game_service::{CreateGameRequest, GameService};
pub use generation::{GeneratedQuestion, GenerationConfig, OpenAiQuestionGenerator, QuestionGenerator};
pub use stats_service::{GameStatistics, QuestionBreakdown, StatsService};
pub use topics_service::TopicsService;
pub use view::{GameView, QuestionView};
