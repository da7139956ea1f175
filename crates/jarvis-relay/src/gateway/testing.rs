//! Scripted gateways for handler tests

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use super::{CompletionGateway, CompletionRequest};
use crate::error::ChatError;

/// Answers every call with the same outcome and records what it was asked
pub struct ScriptedGateway {
    outcome: Result<String, ChatError>,
    delay: Option<Duration>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGateway {
    pub fn replying(reply: &str) -> Self {
        Self::with_outcome(Ok(reply.to_string()))
    }

    pub fn failing(err: ChatError) -> Self {
        Self::with_outcome(Err(err))
    }

    /// Replies only after `delay`, for exercising the caller's timeout
    pub fn stalling(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::replying("too late")
        }
    }

    fn with_outcome(outcome: Result<String, ChatError>) -> Self {
        Self {
            outcome,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ChatError> {
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}
