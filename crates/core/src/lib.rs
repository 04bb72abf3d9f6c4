//! HurtBot Core Library
//!
//! This crate provides the foundational utilities shared by every HurtBot crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Consolidated configuration

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, IntentKeywords, RagSettings};
pub use error::{AppError, AppResult};
