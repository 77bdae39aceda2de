pub mod agent;
pub mod config;
pub mod error;
pub mod executor;
pub mod llm;
pub mod parser;
pub mod prompt;
pub mod session;

// Re-exports for convenience
pub use agent::TurnCycle;
pub use config::Config;
pub use error::ChatshError;
pub use llm::{create_backend, LlmBackend};
