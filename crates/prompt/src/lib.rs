//! Prompt system for HurtBot.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions, built in or overridden from disk
//! - Handlebars template rendering for system and user messages

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{
    list_prompts, load_prompt, PromptLibrary, CLASSIFY_PROMPT_ID, GENERAL_ANSWER_PROMPT_ID,
    MATERIALS_PROMPT_ID,
};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptOutputSpec};
