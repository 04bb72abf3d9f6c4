//! LLM provider types.

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Azure,
    Ollama,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "azure" | "azure-ai" | "foundry" => Some(Self::Azure),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Azure => "azure",
            Self::Ollama => "ollama",
        }
    }

    /// Model used when the configuration names none.
    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            // Azure deployments have no sensible default
            Self::Azure => None,
            Self::Ollama => Some("llama3.2"),
        }
    }
}
