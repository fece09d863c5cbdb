use super::{ChatMessage, ChatModel, LlmError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "phi4";

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f32>,
    /// Generation halts when the model emits one of these
    pub stop: Vec<String>,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            stop: Vec::new(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Non-streaming client for Ollama's `/api/chat`
pub struct OllamaChat {
    client: Client,
    config: OllamaConfig,
}

impl OllamaChat {
    pub fn new(config: OllamaConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn build_request<'a>(&'a self, messages: &'a [ChatMessage]) -> OllamaChatRequest<'a> {
        let options = if self.config.temperature.is_some() || !self.config.stop.is_empty() {
            Some(OllamaOptions {
                temperature: self.config.temperature,
                stop: (!self.config.stop.is_empty()).then_some(self.config.stop.as_slice()),
            })
        } else {
            None
        };

        OllamaChatRequest {
            model: &self.config.model,
            messages,
            options,
            stream: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OllamaOptions<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

#[async_trait]
impl ChatModel for OllamaChat {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.config.base_url.trim_end_matches('/'));
        debug!(model = %self.config.model, messages = messages.len(), "Sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&self.build_request(messages))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaChatResponse = response.json().await?;
        Ok(parsed.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_chat(url: String, stop: Vec<String>) -> OllamaChat {
        OllamaChat::new(OllamaConfig {
            base_url: url,
            stop,
            ..OllamaConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_chat_returns_message_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "model": "phi4",
                "stream": false,
                "messages": [{"role": "user", "content": "Hi"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"model": "phi4", "message": {"role": "assistant", "content": "Hello!"}, "done": true}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let reply = test_chat(mock_server.uri(), vec![])
            .chat(&[ChatMessage::user("Hi")])
            .await
            .unwrap();

        assert_eq!(reply, "Hello!");
    }

    #[tokio::test]
    async fn test_stop_sequences_sent_as_options() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "options": {"stop": ["\nObservation:"]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"message": {"role": "assistant", "content": "ok"}, "done": true}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let reply = test_chat(mock_server.uri(), vec!["\nObservation:".to_string()])
            .chat(&[ChatMessage::user("Hi")])
            .await
            .unwrap();

        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string(r#"{"error": "model 'phi4' not found"}"#),
            )
            .mount(&mock_server)
            .await;

        let err = test_chat(mock_server.uri(), vec![])
            .chat(&[ChatMessage::user("Hi")])
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Status { status: 404, .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_request_omits_empty_options() {
        let chat = test_chat("http://localhost:11434".to_string(), vec![]);
        let messages = [ChatMessage::system("sys")];
        let json = serde_json::to_value(chat.build_request(&messages)).unwrap();

        assert!(json.get("options").is_none());
        assert_eq!(json["messages"][0]["role"], "system");
    }
}
