//! Error types for HurtBot.
//!
//! This module defines a unified error enum that covers every failure
//! category in the assistant: configuration, I/O, the chat model, the
//! document retriever, web search, the inventory store, the catalog,
//! prompts and structured-output extraction.

use thiserror::Error;

/// Unified error type for HurtBot.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Handlers decide per variant whether to degrade or to fail; nothing here
/// is ever shown verbatim to an HTTP caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Chat-completion provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Document retriever (search index) errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Generic web search errors
    #[error("Web search error: {0}")]
    Search(String),

    /// Inventory store errors
    #[error("Inventory error: {0}")]
    Inventory(String),

    /// Product catalog errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// LLM output that does not match the expected structure
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
