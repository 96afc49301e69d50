use std::time::Duration;

use async_openai::error::OpenAIError;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
  #[error("completion request failed: {0}")]
  Api(#[from] OpenAIError),

  #[error("completion timed out after {0:?}")]
  Timeout(Duration),

  #[error("empty message content")]
  Empty,
}

/// A text-completion service: one flattened prompt in, generated text out.
#[async_trait]
pub trait TextCompletion: Send + Sync {
  async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
