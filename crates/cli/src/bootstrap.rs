//! Construction of the answering pipeline from configuration.

use hurtbot_core::{config::AppConfig, AppError, AppResult};
use hurtbot_knowledge::{
    Assistant, AssistantParts, AzureSearchRetriever, Catalog, DuckDuckGoSearch, IntentVocabulary,
    SqliteInventory,
};
use hurtbot_llm::{create_client, resolve_model};
use hurtbot_prompt::PromptLibrary;
use std::sync::Arc;
use std::time::Duration;

/// Open the stock database named by the configuration.
pub fn open_inventory(config: &AppConfig) -> AppResult<SqliteInventory> {
    SqliteInventory::open(&config.inventory.database)
}

/// Build an [`Assistant`] with production clients.
///
/// Validates the configuration first so every missing key is reported at once.
pub fn build_assistant(config: &AppConfig) -> AppResult<Assistant> {
    config.validate()?;

    let catalog = Catalog::load(&config.catalog_path)?;
    let inventory = open_inventory(config)?;
    let retriever = AzureSearchRetriever::new(&config.search)?;
    let web_search = DuckDuckGoSearch::new(Duration::from_secs(config.search.timeout_secs))?;

    let llm = create_client(&config.llm)
        .map_err(|e| AppError::Config(format!("Failed to create LLM client: {}", e)))?;
    let model = resolve_model(&config.llm).map_err(AppError::Config)?;
    let prompts = PromptLibrary::with_overrides(config.prompts_dir.as_deref())?;
    let vocabulary = IntentVocabulary::from_keywords(&config.rag.intents)?;

    tracing::info!(
        "Assistant ready: provider={}, model={}, products={}",
        llm.provider_name(),
        model,
        catalog.len()
    );

    Ok(Assistant::new(AssistantParts {
        catalog: Arc::new(catalog),
        inventory: Arc::new(inventory),
        retriever: Arc::new(retriever),
        web_search: Arc::new(web_search),
        llm,
        prompts: Arc::new(prompts),
        model,
        settings: config.rag.clone(),
        vocabulary,
    }))
}
