//! OpenAI-compatible chat completions over HTTP.
//!
//! One non-streaming POST to `{base_url}/chat/completions` per turn, with a
//! per-request timeout and bearer auth.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{CompletionGateway, CompletionRequest};
use crate::error::ChatError;
use crate::memory::Message;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiGateway {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl OpenAiGateway {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Completion gateway initialized with endpoint: {}", base_url);
        Self {
            base_url,
            api_key: api_key.into(),
            http_client: reqwest::Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn map_transport_error(err: reqwest::Error, request: &CompletionRequest) -> ChatError {
        if err.is_timeout() {
            ChatError::GatewayTimeout(request.timeout)
        } else {
            ChatError::GatewayError(format!("completion request failed: {}", err))
        }
    }
}

#[async_trait]
impl CompletionGateway for OpenAiGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ChatError> {
        debug!(
            "Requesting completion from {} ({} messages, model {})",
            self.base_url,
            request.messages.len(),
            request.model
        );

        let body = ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_transport_error(e, &request))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::GatewayError(format!(
                "provider returned {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ChatError::GatewayTimeout(request.timeout)
            } else {
                ChatError::GatewayError(format!("failed to parse completion response: {}", e))
            }
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or(ChatError::EmptyReply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    fn request(timeout: Duration) -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![Message::system("be brief"), Message::user("hi")],
            temperature: 0.3,
            max_tokens: 512,
            timeout,
        }
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 512,
                "stream": false,
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#)
            .create_async()
            .await;

        let gateway = OpenAiGateway::new("sk-test", server.url());
        let reply = gateway.complete(request(Duration::from_secs(5))).await;

        assert_eq!(reply, Ok("hello".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url_is_ignored() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
            .create_async()
            .await;

        let gateway = OpenAiGateway::new("sk-test", format!("{}/", server.url()));
        assert_eq!(
            gateway.complete(request(Duration::from_secs(5))).await,
            Ok("ok".to_string())
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_gateway_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"invalid api key"}}"#)
            .create_async()
            .await;

        let gateway = OpenAiGateway::new("sk-bad", server.url());
        match gateway.complete(request(Duration::from_secs(5))).await {
            Err(ChatError::GatewayError(detail)) => {
                assert!(detail.contains("401"));
                assert!(detail.contains("invalid api key"));
            }
            other => panic!("expected gateway error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_gateway_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let gateway = OpenAiGateway::new("sk-test", server.url());
        assert!(matches!(
            gateway.complete(request(Duration::from_secs(5))).await,
            Err(ChatError::GatewayError(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_content_is_empty_reply() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let gateway = OpenAiGateway::new("sk-test", server.url());
        assert_eq!(
            gateway.complete(request(Duration::from_secs(5))).await,
            Err(ChatError::EmptyReply)
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_gateway_error() {
        // Nothing listens on port 9 of the loopback interface.
        let gateway = OpenAiGateway::new("sk-test", "http://127.0.0.1:9");
        assert!(matches!(
            gateway.complete(request(Duration::from_secs(5))).await,
            Err(ChatError::GatewayError(_))
        ));
    }

    #[tokio::test]
    async fn test_stalled_provider_is_gateway_timeout() {
        // Accepts connections and never writes a byte back.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stalled = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let gateway = OpenAiGateway::new("sk-test", format!("http://{}", addr));
        let timeout = Duration::from_millis(200);
        assert_eq!(
            gateway.complete(request(timeout)).await,
            Err(ChatError::GatewayTimeout(timeout))
        );

        stalled.abort();
    }
}
