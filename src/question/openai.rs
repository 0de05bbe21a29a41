use super::*;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs,
    },
    Client,
};

/// OpenAI-backed question generator
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
    max_tokens: u32,
}

impl OpenAiGenerator {
    pub fn new(api_key: String, model: String, timeout: Duration, max_tokens: u32) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);

        Self {
            client,
            model,
            timeout,
            max_tokens,
        }
    }
}

#[async_trait]
impl QuestionGenerator for OpenAiGenerator {
    async fn generate(&self, request: &QuestionRequest) -> GenerateResult<Question> {
        let system_content =
            "You write odd-one-out trivia questions. Reply with a single JSON object and \
             nothing else.";

        let user_message = ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(build_generation_prompt(
                request,
            )),
            name: None,
        };

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .max_tokens(self.max_tokens)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_content)
                    .build()
                    .map_err(|e| GenerateError::Api(e.to_string()))?
                    .into(),
                user_message.into(),
            ])
            .build()
            .map_err(|e| GenerateError::Api(e.to_string()))?;

        let response =
            tokio::time::timeout(self.timeout, self.client.chat().create(chat_request))
                .await
                .map_err(|_| GenerateError::Timeout(self.timeout))?
                .map_err(|e| GenerateError::Api(e.to_string()))?;

        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| GenerateError::Parse("no content in response".to_string()))?;

        parse_generated_payload(&text, request)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
