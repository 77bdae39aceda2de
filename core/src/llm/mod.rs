//! LLM backend adapters
//!
//! A backend is an opaque capability: given the new user text and a bounded
//! read-only view of prior history, it produces a finite ordered stream of
//! incremental fragments. The turn-cycle controller is agnostic to which
//! variant is in use; selection happens once at startup via [`create_backend`].

pub mod chat;
pub mod ollama;
pub mod openai;

pub use chat::{ChatMessage, MessageRole};

use crate::config::{BackendKind, Config};
use crate::error::ChatshError;
use anyhow::Result;
use futures::Stream;
use std::pin::Pin;

/// One incremental piece of an in-progress assistant reply.
///
/// `content` is a strictly incremental suffix of the growing reply; `id` is
/// the backend's identifier for the reply being assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// New text since the previous fragment
    pub content: String,
    /// Identifier of the assistant reply under construction
    pub id: String,
}

/// A finite, ordered stream of reply fragments.
///
/// An `Err` item or early termination means the transport failed mid-turn;
/// the controller treats whatever arrived so far as the final message.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment, ChatshError>> + Send>>;

/// Uniform capability over a language-model chat service
#[async_trait::async_trait]
pub trait LlmBackend: Send {
    /// One-time setup before the first turn.
    ///
    /// Fails with a configuration error when a required setting is missing.
    async fn initialize(&mut self) -> Result<(), ChatshError>;

    /// Send the composed turn text and stream back the assistant's reply.
    ///
    /// `history` is the most recent slice of the conversation, oldest first;
    /// backends that keep continuity server-side may ignore it.
    fn send_message(&self, text: &str, history: &[ChatMessage]) -> FragmentStream;
}

/// Build the configured backend variant.
///
/// The backend tag was already validated at config load, so an unknown tag
/// here means the config was constructed by hand; it fails the same way.
pub fn create_backend(config: &Config, system_prompt: String) -> Result<Box<dyn LlmBackend>, ChatshError> {
    match config.backend_kind()? {
        BackendKind::OpenAi => Ok(Box::new(openai::OpenAiBackend::new(
            config.openai.clone(),
            system_prompt,
        ))),
        BackendKind::Ollama => Ok(Box::new(ollama::OllamaBackend::new(
            config.ollama.clone(),
            system_prompt,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OllamaConfig, OpenAiConfig};

    fn config(backend: &str) -> Config {
        Config {
            backend: backend.to_string(),
            openai: OpenAiConfig {
                api_key: "sk-test".to_string(),
                model: "gpt-4o".to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
            },
            ollama: OllamaConfig {
                model: "gemma:7b".to_string(),
                host: "http://localhost:11434".to_string(),
            },
        }
    }

    #[test]
    fn test_factory_dispatch() {
        assert!(create_backend(&config("openai"), String::new()).is_ok());
        assert!(create_backend(&config("ollama"), String::new()).is_ok());
    }

    #[test]
    fn test_factory_rejects_unknown_tag() {
        let err = create_backend(&config("groq"), String::new())
            .err()
            .unwrap();
        assert!(matches!(err, ChatshError::InvalidBackend { .. }));
    }
}
