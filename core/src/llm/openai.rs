//! OpenAI-compatible backend
//!
//! Streams `/chat/completions` responses over SSE. Works with OpenAI and any
//! API-compatible host. History is replayed explicitly on every call; the
//! completion id from the stream chunks threads through each fragment for
//! continuity bookkeeping.

use super::{ChatMessage, Fragment, FragmentStream, LlmBackend};
use crate::config::OpenAiConfig;
use crate::error::ChatshError;
use async_stream::stream;
use futures_util::StreamExt;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

/// Sampling temperature used for every request
const TEMPERATURE: f32 = 0.5;

/// Reply length cap
const MAX_TOKENS: u32 = 4096;

/// OpenAI-compatible chat backend
pub struct OpenAiBackend {
    config: OpenAiConfig,
    system_prompt: String,
    http_client: HttpClient,
}

impl OpenAiBackend {
    pub fn new(config: OpenAiConfig, system_prompt: String) -> Self {
        OpenAiBackend {
            config,
            system_prompt,
            http_client: HttpClient::new(),
        }
    }
}

#[async_trait::async_trait]
impl LlmBackend for OpenAiBackend {
    async fn initialize(&mut self) -> Result<(), ChatshError> {
        if self.config.api_key.trim().is_empty() {
            return Err(ChatshError::MissingSetting {
                backend: "openai".to_string(),
                field: "api_key".to_string(),
            });
        }
        Ok(())
    }

    fn send_message(&self, text: &str, history: &[ChatMessage]) -> FragmentStream {
        let url = format!("{}/chat/completions", self.config.base_url);
        let api_key = self.config.api_key.clone();
        let http_client = self.http_client.clone();

        let mut messages = vec![WireMessage::from_parts("system", &self.system_prompt)];
        messages.extend(history.iter().map(WireMessage::from));
        messages.push(WireMessage::from_parts("user", text));

        let body = CompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream: true,
        };

        Box::pin(stream! {
            let response = match http_client
                .post(&url)
                .bearer_auth(&api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    yield Err(ChatshError::Transport {
                        message: e.to_string(),
                    });
                    return;
                }
            };

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let message = response.text().await.unwrap_or_default();
                yield Err(ChatshError::BackendStatus { status, message });
                return;
            }

            let mut bytes = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(ChatshError::Transport {
                            message: e.to_string(),
                        });
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                // Process complete SSE lines
                while let Some(newline_pos) = buffer.find('\n') {
                    let line = buffer[..newline_pos].trim_end().to_string();
                    buffer.drain(..=newline_pos);

                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    if data == "[DONE]" {
                        return;
                    }

                    if let Ok(parsed) = serde_json::from_str::<StreamChunk>(data) {
                        if let Some(delta) = parsed
                            .choices
                            .first()
                            .and_then(|c| c.delta.content.as_ref())
                        {
                            if !delta.is_empty() {
                                yield Ok(Fragment {
                                    content: delta.clone(),
                                    id: parsed.id.clone(),
                                });
                            }
                        }
                    }
                }
            }
        })
    }
}

// Wire types for the chat completions API

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

impl WireMessage {
    fn from_parts(role: &str, content: &str) -> Self {
        WireMessage {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

impl From<&ChatMessage> for WireMessage {
    fn from(msg: &ChatMessage) -> Self {
        let role = match msg.role {
            super::MessageRole::System => "system",
            super::MessageRole::User => "user",
            super::MessageRole::Assistant => "assistant",
        };
        WireMessage::from_parts(role, &msg.content)
    }
}

#[derive(Deserialize)]
struct StreamChunk {
    id: String,
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_requires_api_key() {
        let mut backend = OpenAiBackend::new(OpenAiConfig::default(), String::new());
        let err = backend.initialize().await.unwrap_err();
        assert!(matches!(err, ChatshError::MissingSetting { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_initialize_with_api_key() {
        let config = OpenAiConfig {
            api_key: "sk-test".to_string(),
            ..Default::default()
        };
        let mut backend = OpenAiBackend::new(config, String::new());
        assert!(backend.initialize().await.is_ok());
    }

    #[test]
    fn test_stream_chunk_parsing() {
        let data = r#"{"id":"chatcmpl-9","object":"chat.completion.chunk","created":1,"model":"gpt-4o","choices":[{"index":0,"delta":{"content":"ls"},"finish_reason":null}]}"#;
        let parsed: StreamChunk = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.id, "chatcmpl-9");
        assert_eq!(parsed.choices[0].delta.content.as_deref(), Some("ls"));
    }
}
