//! Question sourcing: generative providers with a curated fallback bank.
//!
//! Providers are tried in order; any error or malformed result is treated as
//! "unavailable" and the chain moves on. The bank is the deterministic last
//! stage and only fails once a theme's pool is fully exhausted.

pub mod bank;
mod ollama;
mod openai;

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{GameError, GameResult};
use crate::types::{Difficulty, Question, QuestionId, QuestionOption, ThemeId};

pub use ollama::OllamaGenerator;
pub use openai::OpenAiGenerator;

/// Result type for generator operations
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Errors that can occur while generating a question. Never fatal to a
/// session: the fetch chain falls back to the curated bank on any of these.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("response parsing failed: {0}")]
    Parse(String),
}

/// What the engine asks a source for
#[derive(Debug, Clone)]
pub struct QuestionRequest {
    pub theme_id: ThemeId,
    pub theme_label: String,
    pub difficulty: Difficulty,
    /// Question ids (and generation seeds) already shown this session
    pub excluded_question_ids: HashSet<QuestionId>,
    /// Normalized option texts already shown this session
    pub excluded_option_texts: HashSet<String>,
}

/// Trait that all generative question providers implement
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Generate one odd-one-out question for the request
    async fn generate(&self, request: &QuestionRequest) -> GenerateResult<Question>;

    /// Name of this generator, for logging
    fn name(&self) -> &str;
}

/// Two-stage source: generators in order, then the curated bank.
pub struct QuestionSource {
    generators: Vec<Box<dyn QuestionGenerator>>,
}

impl QuestionSource {
    pub fn new(generators: Vec<Box<dyn QuestionGenerator>>) -> Self {
        Self { generators }
    }

    /// A source that only draws from the curated bank
    pub fn bank_only() -> Self {
        Self::new(Vec::new())
    }

    /// Fetch one sanitized question, or `FetchExhausted` when the theme has
    /// nothing left to offer from any stage.
    pub async fn fetch(&self, request: &QuestionRequest) -> GameResult<Question> {
        for generator in &self.generators {
            match generator.generate(request).await {
                Ok(raw) => match sanitize_question(raw) {
                    Ok(question) => {
                        tracing::info!(
                            "generator {} produced question {}",
                            generator.name(),
                            question.id
                        );
                        return Ok(question);
                    }
                    Err(err) => {
                        tracing::warn!(
                            "generator {} produced malformed question: {}",
                            generator.name(),
                            err
                        );
                    }
                },
                Err(err) => {
                    tracing::warn!("generator {} unavailable: {}", generator.name(), err);
                }
            }
        }

        let fallback = bank::fallback_question(
            &request.theme_id,
            request.difficulty,
            &request.excluded_question_ids,
        )
        .ok_or(GameError::FetchExhausted)?;

        // A malformed bank question means the theme can no longer produce a
        // playable question, which callers treat the same as exhaustion.
        sanitize_question(fallback).map_err(|_| GameError::FetchExhausted)
    }
}

/// Trim + case-fold, the comparison key for option-text uniqueness
pub(crate) fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Drop options with duplicate normalized text (keeping the first occurrence)
/// and re-derive the odd option id from the survivors.
pub fn sanitize_question(mut question: Question) -> GameResult<Question> {
    let mut seen = HashSet::new();
    question
        .options
        .retain(|option| seen.insert(normalize_text(&option.text)));

    let odd_id = question
        .odd_option()
        .map(|o| o.id.clone())
        .ok_or(GameError::MalformedQuestion)?;
    question.odd_option_id = odd_id;
    Ok(question)
}

/// Instruction text shared by all generators. The reply must be a single JSON
/// object so `parse_generated_payload` can handle it uniformly.
pub(crate) fn build_generation_prompt(request: &QuestionRequest) -> String {
    let exclusions = if request.excluded_option_texts.is_empty() {
        "Ensure all options use distinct language.".to_string()
    } else {
        let mut texts: Vec<&str> = request
            .excluded_option_texts
            .iter()
            .map(String::as_str)
            .collect();
        texts.sort_unstable();
        format!("Avoid reusing these option phrasings: {}", texts.join("; "))
    };

    let previous = if request.excluded_question_ids.is_empty() {
        "Keep every prompt distinct from earlier questions in this session.".to_string()
    } else {
        let mut ids: Vec<&str> = request
            .excluded_question_ids
            .iter()
            .map(String::as_str)
            .collect();
        ids.sort_unstable();
        format!(
            "Avoid repeating prompts that match any of these seeds: {}.",
            ids.join(", ")
        )
    };

    let difficulty = match request.difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Medium => "medium",
        Difficulty::Hard => "hard",
        Difficulty::Expert => "expert",
    };

    [
        "You are a quiz master generating fast-paced odd-one-out trivia.".to_string(),
        "Game rules: present exactly four answer options. Exactly one option must be the odd \
         one out (intentionally incorrect or thematically misaligned)."
            .to_string(),
        "The other three options must closely relate to the prompt and be unique.".to_string(),
        format!(
            "Theme focus: \"{}\" (id: {}). The difficulty should feel {}.",
            request.theme_label, request.theme_id, difficulty
        ),
        "Keep the prompt concise (<120 characters) and the options under 60 characters each."
            .to_string(),
        exclusions,
        previous,
        "Return JSON only with fields: prompt (string) and options (array of \
         { text, is_odd_one_out })."
            .to_string(),
    ]
    .join("\n")
}

#[derive(Debug, Deserialize)]
struct GeneratedPayload {
    prompt: String,
    options: Vec<GeneratedOption>,
}

#[derive(Debug, Deserialize)]
struct GeneratedOption {
    text: String,
    is_odd_one_out: bool,
}

/// Parse a generator reply into a Question. Accepts raw JSON or JSON inside a
/// markdown code fence, which chat models produce even when told not to.
pub(crate) fn parse_generated_payload(
    text: &str,
    request: &QuestionRequest,
) -> GenerateResult<Question> {
    let body = strip_code_fence(text);
    let payload: GeneratedPayload =
        serde_json::from_str(body).map_err(|e| GenerateError::Parse(e.to_string()))?;

    if payload.options.len() < 2 {
        return Err(GenerateError::Parse(format!(
            "expected at least 2 options, got {}",
            payload.options.len()
        )));
    }

    let odd_index = payload
        .options
        .iter()
        .position(|o| o.is_odd_one_out)
        .ok_or_else(|| GenerateError::Parse("no option flagged as odd one out".to_string()))?;

    let id = ulid::Ulid::new().to_string();
    let options: Vec<QuestionOption> = payload
        .options
        .into_iter()
        .enumerate()
        .map(|(index, option)| QuestionOption {
            id: format!("{id}-option-{index}"),
            text: option.text,
            is_odd_one_out: option.is_odd_one_out,
        })
        .collect();

    Ok(Question {
        odd_option_id: options[odd_index].id.clone(),
        id: id.clone(),
        seed: id,
        prompt: payload.prompt,
        theme_id: request.theme_id.clone(),
        difficulty: request.difficulty,
        options,
        provenance: crate::types::QuestionProvenance::Generated,
        created_at: chrono::Utc::now().to_rfc3339(),
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Configuration for generative providers, loaded from the environment
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// OpenAI API key; provider disabled when absent
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    /// Ollama base URL; provider disabled when absent
    pub ollama_base_url: Option<String>,
    pub ollama_model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            ollama_base_url: None,
            ollama_model: "llama3.2".to_string(),
            timeout: Duration::from_secs(10),
            max_tokens: 300,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            openai_model: non_empty_env("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            ollama_base_url: non_empty_env("OLLAMA_BASE_URL"),
            ollama_model: non_empty_env("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            timeout: non_empty_env("GENERATOR_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_tokens: non_empty_env("GENERATOR_MAX_TOKENS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_tokens),
        }
    }

    /// Build the ordered generator list. An empty list is fine: the curated
    /// bank carries the game on its own.
    pub fn build_generators(&self) -> Vec<Box<dyn QuestionGenerator>> {
        let mut generators: Vec<Box<dyn QuestionGenerator>> = Vec::new();

        if let Some(api_key) = &self.openai_api_key {
            generators.push(Box::new(OpenAiGenerator::new(
                api_key.clone(),
                self.openai_model.clone(),
                self.timeout,
                self.max_tokens,
            )));
        }

        if let Some(base_url) = &self.ollama_base_url {
            generators.push(Box::new(OllamaGenerator::new(
                base_url.clone(),
                self.ollama_model.clone(),
                self.timeout,
                self.max_tokens,
            )));
        }

        generators
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
