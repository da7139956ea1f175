//! Completion gateway - the single remote call made per chat turn

pub mod openai_gateway;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::ChatError;
use crate::memory::Message;

pub use openai_gateway::OpenAiGateway;

/// Everything the provider needs to produce one reply
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Returns the raw reply text. Callers decide what counts as empty.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ChatError>;
}
