use std::time::Duration;

use async_openai::{
  Client,
  config::OpenAIConfig,
  types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
    CreateChatCompletionRequestArgs,
  },
};
use async_trait::async_trait;
use nemia_shared::APP_ENV;

use crate::{CompletionError, TextCompletion};

#[derive(Debug, Clone)]
pub struct CompletionConfig {
  pub api_base: String,
  pub api_key: String,
  pub model: String,
  pub timeout: Duration,
}

impl CompletionConfig {
  pub fn from_env() -> Self {
    Self {
      api_base: APP_ENV.openai_base_url.clone(),
      api_key: APP_ENV.openai_api_key.clone(),
      model: APP_ENV.openai_chat_model.clone(),
      timeout: APP_ENV.completion_timeout,
    }
  }
}

/// Chat-completion client for any OpenAI-compatible endpoint.
pub struct OpenAiCompletion {
  client: Client<OpenAIConfig>,
  model: String,
  timeout: Duration,
}

impl OpenAiCompletion {
  pub fn new(config: CompletionConfig) -> Self {
    let openai_config = OpenAIConfig::new()
      .with_api_key(config.api_key)
      .with_api_base(config.api_base);

    Self {
      client: Client::with_config(openai_config),
      model: config.model,
      timeout: config.timeout,
    }
  }

  pub async fn generate_text(
    &self,
    messages: Vec<ChatCompletionRequestMessage>,
  ) -> Result<String, CompletionError> {
    let request = CreateChatCompletionRequestArgs::default()
      .model(&self.model)
      .messages(messages)
      .build()?;

    let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
      .await
      .map_err(|_| CompletionError::Timeout(self.timeout))??;

    response
      .choices
      .into_iter()
      .filter_map(|c| c.message.content)
      .last()
      .ok_or(CompletionError::Empty)
  }
}

#[async_trait]
impl TextCompletion for OpenAiCompletion {
  /// The whole prompt goes out as a single user message; there is no
  /// separate system role.
  async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
    let user = ChatCompletionRequestUserMessage::from(prompt.to_owned());
    tracing::debug!(model = %self.model, prompt_len = prompt.len(), "requesting completion");
    self
      .generate_text(vec![ChatCompletionRequestMessage::User(user)])
      .await
  }
}
