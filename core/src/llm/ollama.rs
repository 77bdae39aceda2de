//! Ollama backend
//!
//! Streams `/api/chat` responses from a locally-hosted Ollama server. The
//! wire format is newline-delimited JSON rather than SSE. Ollama assigns no
//! reply identifiers, so each reply gets a fresh UUID.

use super::{ChatMessage, Fragment, FragmentStream, LlmBackend, MessageRole};
use crate::config::OllamaConfig;
use crate::error::ChatshError;
use async_stream::stream;
use futures_util::StreamExt;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

/// Ollama chat backend
pub struct OllamaBackend {
    config: OllamaConfig,
    system_prompt: String,
    http_client: HttpClient,
}

impl OllamaBackend {
    pub fn new(config: OllamaConfig, system_prompt: String) -> Self {
        OllamaBackend {
            config,
            system_prompt,
            http_client: HttpClient::new(),
        }
    }
}

#[async_trait::async_trait]
impl LlmBackend for OllamaBackend {
    async fn initialize(&mut self) -> Result<(), ChatshError> {
        if self.config.model.trim().is_empty() {
            return Err(ChatshError::MissingSetting {
                backend: "ollama".to_string(),
                field: "model".to_string(),
            });
        }
        Ok(())
    }

    fn send_message(&self, text: &str, history: &[ChatMessage]) -> FragmentStream {
        let url = format!("{}/api/chat", self.config.host);
        let http_client = self.http_client.clone();

        let mut messages = vec![WireMessage::new("system", &self.system_prompt)];
        messages.extend(history.iter().map(|m| {
            WireMessage::new(
                match m.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                },
                &m.content,
            )
        }));
        messages.push(WireMessage::new("user", text));

        let body = OllamaChatRequest {
            model: self.config.model.clone(),
            messages,
            stream: true,
        };

        let reply_id = uuid::Uuid::new_v4().to_string();

        Box::pin(stream! {
            let response = match http_client.post(&url).json(&body).send().await {
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

                // Each complete line is one JSON chat chunk
                while let Some(newline_pos) = buffer.find('\n') {
                    let line = buffer[..newline_pos].trim().to_string();
                    buffer.drain(..=newline_pos);
                    if line.is_empty() {
                        continue;
                    }

                    let Ok(parsed) = serde_json::from_str::<OllamaChatChunk>(&line) else {
                        continue;
                    };
                    if let Some(message) = parsed.message {
                        if !message.content.is_empty() {
                            yield Ok(Fragment {
                                content: message.content,
                                id: reply_id.clone(),
                            });
                        }
                    }
                    if parsed.done {
                        return;
                    }
                }
            }
        })
    }
}

// Wire types for the Ollama chat API

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

impl WireMessage {
    fn new(role: &str, content: &str) -> Self {
        WireMessage {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct OllamaChatChunk {
    message: Option<OllamaWireMessage>,
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct OllamaWireMessage {
    content: String,
}
