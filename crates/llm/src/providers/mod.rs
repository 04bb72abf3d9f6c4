//! Chat-completion provider implementations.

pub mod azure;
pub mod ollama;

pub use azure::AzureChatClient;
pub use ollama::OllamaClient;
