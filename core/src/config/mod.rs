//! Configuration management
//!
//! Loads the YAML config file from `~/.config/chatsh/chatsh.yaml`, selecting
//! exactly one backend variant and its settings. An unrecognized backend tag
//! fails fast before any conversation begins.

use crate::error::ChatshError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "chatsh.yaml";

/// Default config directory name
const CONFIG_DIR_NAME: &str = "chatsh";

/// Which backend variant to drive the conversation with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// OpenAI-compatible hosted API
    OpenAi,
    /// Locally-hosted Ollama instance
    Ollama,
}

impl std::str::FromStr for BackendKind {
    type Err = ChatshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(BackendKind::OpenAi),
            "ollama" => Ok(BackendKind::Ollama),
            _ => Err(ChatshError::InvalidBackend {
                name: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::OpenAi => write!(f, "openai"),
            BackendKind::Ollama => write!(f, "ollama"),
        }
    }
}

/// Settings for the OpenAI-compatible backend
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAiConfig {
    /// API key (required)
    #[serde(default)]
    pub api_key: String,
    /// Model name
    #[serde(default = "default_openai_model")]
    pub model: String,
    /// Base URL of the API
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: String::new(),
            model: default_openai_model(),
            base_url: default_openai_base_url(),
        }
    }
}

/// Settings for the Ollama backend
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OllamaConfig {
    /// Model name
    #[serde(default = "default_ollama_model")]
    pub model: String,
    /// Host address of the Ollama server
    #[serde(default = "default_ollama_host")]
    pub host: String,
}

fn default_ollama_model() -> String {
    "gemma:7b".to_string()
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        OllamaConfig {
            model: default_ollama_model(),
            host: default_ollama_host(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Name of the backend to use ("openai" or "ollama")
    pub backend: String,

    /// OpenAI backend settings
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Ollama backend settings
    #[serde(default)]
    pub ollama: OllamaConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// A missing file is a `ConfigNotFound`; the caller prints the template
    /// from [`Config::template`] and exits.
    pub fn load() -> Result<Self, ChatshError> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &PathBuf) -> Result<Self, ChatshError> {
        if !path.exists() {
            return Err(ChatshError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let raw = fs::read_to_string(path).map_err(|e| ChatshError::InvalidConfig {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let config: Config =
            serde_yml::from_str(&raw).map_err(|e| ChatshError::InvalidConfig {
                reason: e.to_string(),
            })?;

        // Reject unknown backend tags before anything else runs.
        config.backend_kind()?;

        Ok(config)
    }

    /// Parse the configured backend tag.
    pub fn backend_kind(&self) -> Result<BackendKind, ChatshError> {
        self.backend.parse()
    }

    /// Model name of the selected backend (for the startup banner).
    pub fn model_name(&self) -> &str {
        match self.backend_kind() {
            Ok(BackendKind::Ollama) => &self.ollama.model,
            _ => &self.openai.model,
        }
    }

    /// Default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// YAML template printed when no config file exists.
    pub fn template() -> String {
        format!(
            r#"Config file not found: {}
Please create a config file in the following format:

backend: openai | ollama
openai:
  api_key: sk-...
  model: gpt-4o
ollama:
  model: gemma:7b
  host: http://localhost:11434
"#,
            Self::config_path().display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("openai".parse::<BackendKind>().unwrap(), BackendKind::OpenAi);
        assert_eq!("OLLAMA".parse::<BackendKind>().unwrap(), BackendKind::Ollama);
        assert!("groq".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "backend: ollama\nollama:\n  model: llama3\n  host: http://10.0.0.2:11434\n"
        )
        .unwrap();

        let config = Config::load_from(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.backend_kind().unwrap(), BackendKind::Ollama);
        assert_eq!(config.ollama.model, "llama3");
        assert_eq!(config.ollama.host, "http://10.0.0.2:11434");
        assert_eq!(config.model_name(), "llama3");
    }

    #[test]
    fn test_load_applies_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "backend: openai\nopenai:\n  api_key: sk-test\n").unwrap();

        let config = Config::load_from(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.ollama.host, "http://localhost:11434");
    }

    #[test]
    fn test_unknown_backend_rejected_at_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "backend: groq\n").unwrap();

        let err = Config::load_from(&file.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, ChatshError::InvalidBackend { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ChatshError::ConfigNotFound { .. }));
    }
}
