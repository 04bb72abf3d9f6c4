//! Prompt loader for built-in and on-disk YAML prompt definitions.
//!
//! The built-in prompts are compiled into the binary. A prompts directory
//! may hold `<id>.yml` files that replace built-ins with the same id.

use crate::types::PromptDefinition;
use hurtbot_core::{AppError, AppResult};
use std::collections::HashMap;
use std::path::Path;

/// Query classifier prompt.
pub const CLASSIFY_PROMPT_ID: &str = "query.classify";

/// Answer synthesis prompt for general questions.
pub const GENERAL_ANSWER_PROMPT_ID: &str = "answer.general";

/// Structured materials extraction prompt.
pub const MATERIALS_PROMPT_ID: &str = "materials.extract";

const BUILTIN_PROMPTS: [(&str, &str); 3] = [
    (
        CLASSIFY_PROMPT_ID,
        include_str!("../prompts/query.classify.yml"),
    ),
    (
        GENERAL_ANSWER_PROMPT_ID,
        include_str!("../prompts/answer.general.yml"),
    ),
    (
        MATERIALS_PROMPT_ID,
        include_str!("../prompts/materials.extract.yml"),
    ),
];

/// Set of prompt definitions keyed by id.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    prompts: HashMap<String, PromptDefinition>,
}

impl PromptLibrary {
    /// Library holding only the built-in prompts.
    pub fn builtin() -> AppResult<Self> {
        let mut prompts = HashMap::new();
        for (id, contents) in BUILTIN_PROMPTS {
            let definition = parse_prompt(contents, id)?;
            prompts.insert(definition.id.clone(), definition);
        }
        Ok(Self { prompts })
    }

    /// Built-in prompts, replaced by any `<id>.yml` found in `prompts_dir`.
    pub fn with_overrides(prompts_dir: Option<&Path>) -> AppResult<Self> {
        let mut library = Self::builtin()?;

        if let Some(dir) = prompts_dir {
            for id in list_prompts(dir)? {
                let definition = load_prompt(dir, &id)?;
                tracing::info!("Prompt override: {} ({})", definition.id, definition.title);
                library.insert(definition);
            }
        }

        Ok(library)
    }

    /// Add or replace a definition.
    pub fn insert(&mut self, definition: PromptDefinition) {
        self.prompts.insert(definition.id.clone(), definition);
    }

    /// Look up a definition by id.
    pub fn get(&self, prompt_id: &str) -> AppResult<&PromptDefinition> {
        self.prompts
            .get(prompt_id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))
    }
}

/// Load a prompt definition by ID from a prompts directory.
///
/// # Arguments
/// * `prompts_dir` - Directory containing `<id>.yml` files
/// * `prompt_id` - Prompt identifier (e.g., "answer.general")
pub fn load_prompt(prompts_dir: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir.join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    parse_prompt(&contents, &prompt_file.display().to_string())
}

/// List all prompt IDs in a prompts directory.
pub fn list_prompts(prompts_dir: &Path) -> AppResult<Vec<String>> {
    if !prompts_dir.exists() {
        return Ok(Vec::new());
    }

    let mut prompt_ids = Vec::new();

    for entry in walkdir::WalkDir::new(prompts_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                prompt_ids.push(stem.to_string());
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    // Validate API version format (simple check)
    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
