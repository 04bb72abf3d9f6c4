//! Chat-completion integration crate for HurtBot.
//!
//! This crate provides a provider-agnostic abstraction for chat-completion
//! models behind the [`LlmClient`] trait.
//!
//! # Providers
//! - **Azure AI Foundry**: production chat deployments (default)
//! - **Ollama**: local runtime for development
//!
//! # Example
//! ```no_run
//! use hurtbot_core::config::LlmSettings;
//! use hurtbot_llm::{create_client, LlmRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = LlmSettings { provider: "ollama".into(), ..LlmSettings::default() };
//! let client = create_client(&settings)?;
//! let request = LlmRequest::new("Czy macie cement?", "llama3.2").with_temperature(0.0);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, resolve_model};
pub use providers::{AzureChatClient, OllamaClient};
pub use types::ProviderType;
