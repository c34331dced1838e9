//! Question generation client.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint and converts the
//! model output into strictly validated question records. The client carries
//! no retry or timeout policy of its own; the creation orchestrator wraps
//! the single call in its bounded timeout, and any failure here aborts the
//! whole creation.

use std::env;

use async_trait::async_trait;
use quiz_core::model::GameKind;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Number of incorrect options generated alongside each correct answer.
pub const DISTRACTOR_COUNT: usize = 3;

/// One generated question, tagged by kind so a malformed provider payload
/// can never smuggle the wrong shape past this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedQuestion {
    Mcq {
        prompt: String,
        answer: String,
        distractors: [String; DISTRACTOR_COUNT],
    },
    OpenEnded {
        prompt: String,
        answer: String,
    },
}

impl GeneratedQuestion {
    #[must_use]
    pub fn kind(&self) -> GameKind {
        match self {
            GeneratedQuestion::Mcq { .. } => GameKind::Mcq,
            GeneratedQuestion::OpenEnded { .. } => GameKind::OpenEnded,
        }
    }
}

/// Invokes an external provider with a topic/kind/amount contract.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Generate `amount` questions about `topic`.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` if the upstream call fails or the payload
    /// does not match the requested kind.
    async fn generate(
        &self,
        topic: &str,
        kind: GameKind,
        amount: u8,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError>;
}

#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl GenerationConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("QUIZ_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("QUIZ_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("QUIZ_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

#[derive(Clone)]
pub struct OpenAiQuestionGenerator {
    client: Client,
    config: Option<GenerationConfig>,
}

impl OpenAiQuestionGenerator {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(GenerationConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<GenerationConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl QuestionGenerator for OpenAiQuestionGenerator {
    async fn generate(
        &self,
        topic: &str,
        kind: GameKind,
        amount: u8,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError> {
        let config = self.config.as_ref().ok_or(GenerationError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(kind),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(topic, kind, amount),
                },
            ],
            temperature: 0.7,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GenerationError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GenerationError::Empty)?;

        parse_questions(&content, kind, amount)
    }
}

fn system_prompt(kind: GameKind) -> String {
    let shape = match kind {
        GameKind::Mcq => {
            r#"{"question": "...", "answer": "...", "option1": "...", "option2": "...", "option3": "..."}"#
        }
        GameKind::OpenEnded => r#"{"question": "...", "answer": "..."}"#,
    };
    format!(
        "You are a helpful AI that generates quiz questions and answers. \
         The length of each answer must not exceed 15 words. \
         Respond with a JSON array only, where each element has the shape {shape}."
    )
}

fn user_prompt(topic: &str, kind: GameKind, amount: u8) -> String {
    match kind {
        GameKind::Mcq => format!(
            "Generate {amount} hard multiple-choice questions about {topic}. \
             For each question provide the correct answer and three incorrect options."
        ),
        GameKind::OpenEnded => {
            format!("Generate {amount} hard open-ended questions about {topic}.")
        }
    }
}

/// Parses provider output into validated question records.
///
/// The provider is asked for a bare JSON array but models occasionally wrap
/// it in a Markdown code fence, so fences are stripped before parsing.
pub(crate) fn parse_questions(
    content: &str,
    kind: GameKind,
    amount: u8,
) -> Result<Vec<GeneratedQuestion>, GenerationError> {
    let raw: Vec<RawQuestion> = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| GenerationError::InvalidPayload(e.to_string()))?;

    if raw.is_empty() {
        return Err(GenerationError::Empty);
    }

    let mut questions = Vec::with_capacity(raw.len().min(amount as usize));
    for item in raw {
        questions.push(item.into_question(kind)?);
        if questions.len() == amount as usize {
            break;
        }
    }

    if questions.len() < amount as usize {
        return Err(GenerationError::InvalidPayload(format!(
            "expected {amount} questions, got {}",
            questions.len()
        )));
    }

    Ok(questions)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    question: Option<String>,
    answer: Option<String>,
    option1: Option<String>,
    option2: Option<String>,
    option3: Option<String>,
}

impl RawQuestion {
    fn into_question(self, kind: GameKind) -> Result<GeneratedQuestion, GenerationError> {
        let prompt = require_field(self.question, "question")?;
        let answer = require_field(self.answer, "answer")?;

        match kind {
            GameKind::Mcq => {
                let distractors = [
                    require_field(self.option1, "option1")?,
                    require_field(self.option2, "option2")?,
                    require_field(self.option3, "option3")?,
                ];
                Ok(GeneratedQuestion::Mcq {
                    prompt,
                    answer,
                    distractors,
                })
            }
            GameKind::OpenEnded => Ok(GeneratedQuestion::OpenEnded { prompt, answer }),
        }
    }
}

fn require_field(value: Option<String>, name: &str) -> Result<String, GenerationError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(GenerationError::InvalidPayload(format!(
            "missing required field: {name}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mcq_payload() {
        let content = r#"[
            {"question": "Capital of France?", "answer": "Paris",
             "option1": "London", "option2": "Berlin", "option3": "Madrid"}
        ]"#;
        let questions = parse_questions(content, GameKind::Mcq, 1).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(
            questions[0],
            GeneratedQuestion::Mcq {
                prompt: "Capital of France?".into(),
                answer: "Paris".into(),
                distractors: ["London".into(), "Berlin".into(), "Madrid".into()],
            }
        );
    }

    #[test]
    fn parses_open_ended_payload_inside_code_fence() {
        let content = "```json\n[{\"question\": \"Why is the sky blue?\", \"answer\": \"Rayleigh scattering\"}]\n```";
        let questions = parse_questions(content, GameKind::OpenEnded, 1).unwrap();
        assert_eq!(questions[0].kind(), GameKind::OpenEnded);
    }

    #[test]
    fn mcq_payload_missing_distractor_is_rejected() {
        let content = r#"[
            {"question": "Capital of France?", "answer": "Paris",
             "option1": "London", "option2": "Berlin"}
        ]"#;
        let err = parse_questions(content, GameKind::Mcq, 1).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidPayload(msg) if msg.contains("option3")));
    }

    #[test]
    fn empty_array_is_an_empty_error() {
        let err = parse_questions("[]", GameKind::OpenEnded, 2).unwrap_err();
        assert!(matches!(err, GenerationError::Empty));
    }

    #[test]
    fn short_payload_is_rejected() {
        let content = r#"[{"question": "Q1", "answer": "A1"}]"#;
        let err = parse_questions(content, GameKind::OpenEnded, 3).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidPayload(_)));
    }

    #[test]
    fn extra_items_are_truncated_to_amount() {
        let content = r#"[
            {"question": "Q1", "answer": "A1"},
            {"question": "Q2", "answer": "A2"},
            {"question": "Q3", "answer": "A3"}
        ]"#;
        let questions = parse_questions(content, GameKind::OpenEnded, 2).unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn non_json_payload_is_rejected() {
        let err = parse_questions("Sure! Here are your questions.", GameKind::Mcq, 1).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidPayload(_)));
    }

    #[test]
    fn generator_without_config_is_disabled() {
        let generator = OpenAiQuestionGenerator::new(None);
        assert!(!generator.enabled());
    }
}
