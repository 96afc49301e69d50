// Re-export async_openai types for consumers
pub use async_openai::types::chat::{ChatCompletionRequestMessage, ChatCompletionRequestUserMessage};

mod completion;
pub use completion::{CompletionError, TextCompletion};

mod generate_text;
pub use generate_text::{CompletionConfig, OpenAiCompletion};
