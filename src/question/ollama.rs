use super::*;
use serde::{Deserialize, Serialize};

/// Ollama-backed question generator
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
    max_tokens: u32,
}

impl OllamaGenerator {
    pub fn new(base_url: String, model: String, timeout: Duration, max_tokens: u32) -> Self {
        let client = reqwest::Client::new();

        Self {
            base_url,
            model,
            client,
            timeout,
            max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    /// Constrains the reply to valid JSON
    format: &'static str,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[async_trait]
impl QuestionGenerator for OllamaGenerator {
    async fn generate(&self, request: &QuestionRequest) -> GenerateResult<Question> {
        let ollama_request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: build_generation_prompt(request),
            stream: false,
            format: "json",
            options: OllamaOptions {
                num_predict: self.max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.base_url);

        let response = tokio::time::timeout(
            self.timeout,
            self.client.post(&url).json(&ollama_request).send(),
        )
        .await
        .map_err(|_| GenerateError::Timeout(self.timeout))?
        .map_err(|e| GenerateError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GenerateError::Api(format!(
                "Ollama API returned status: {}",
                response.status()
            )));
        }

        let ollama_response: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Parse(e.to_string()))?;

        parse_generated_payload(&ollama_response.response, request)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    #[ignore] // Only run with Ollama running locally
    async fn test_ollama_generate() {
        let generator = OllamaGenerator::new(
            "http://localhost:11434".to_string(),
            "llama3.2".to_string(),
            Duration::from_secs(30),
            300,
        );

        let request = QuestionRequest {
            theme_id: "anime".to_string(),
            theme_label: "Anime Universe".to_string(),
            difficulty: Difficulty::Easy,
            excluded_question_ids: HashSet::new(),
            excluded_option_texts: HashSet::new(),
        };

        let question = generator.generate(&request).await.unwrap();
        assert!(!question.prompt.is_empty());
        assert_eq!(
            question.options.iter().filter(|o| o.is_odd_one_out).count(),
            1
        );
        println!("Generated question: {:?}", question);
    }
}
