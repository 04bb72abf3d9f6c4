//! Configuration management for HurtBot.
//!
//! This module consolidates every setting of the assistant into one
//! [`AppConfig`], built once at startup from (lowest to highest precedence):
//! - Built-in defaults
//! - A YAML config file (`hurtbot.yaml` or `--config`)
//! - `local.settings.json` `Values` (Azure Functions layout)
//! - `.env` and process environment variables
//! - Command-line flags
//!
//! [`AppConfig::validate`] checks all required keys at once and reports every
//! missing one in a single error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default YAML config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "hurtbot.yaml";

/// Azure Functions local settings file whose `Values` seed the environment.
pub const LOCAL_SETTINGS_FILE: &str = "local.settings.json";

/// LLM providers known to the factory.
pub const KNOWN_PROVIDERS: [&str; 2] = ["azure", "ollama"];

/// Upper bound for cross-sell suggestions in one answer.
pub const MAX_ALTERNATIVES_LIMIT: usize = 3;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file the YAML layer was read from, if any
    pub config_file: Option<PathBuf>,

    /// Static product catalog (JSON)
    pub catalog_path: PathBuf,

    /// Optional directory with prompt overrides (`<id>.yml`)
    pub prompts_dir: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub search: SearchSettings,
    pub inventory: InventorySettings,
    pub rag: RagSettings,
}

/// HTTP front door settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,

    /// Upper bound for one `/ask_rag` request, in seconds
    #[serde(rename = "requestTimeoutSecs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7071,
            request_timeout_secs: 30,
        }
    }
}

/// Chat-completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider name ("azure" or "ollama")
    pub provider: String,

    /// Provider endpoint URL
    pub endpoint: Option<String>,

    /// API key (Azure only)
    #[serde(rename = "apiKey", skip_serializing)]
    pub api_key: Option<String>,

    /// Model or deployment name
    pub model: Option<String>,

    #[serde(rename = "apiVersion")]
    pub api_version: String,

    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "azure".to_string(),
            endpoint: None,
            api_key: None,
            model: None,
            api_version: "2024-05-01-preview".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Managed document search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub endpoint: Option<String>,

    #[serde(rename = "apiKey", skip_serializing)]
    pub api_key: Option<String>,

    #[serde(rename = "productsIndex")]
    pub products_index: String,

    #[serde(rename = "policyIndex")]
    pub policy_index: String,

    /// Index field holding the searchable text
    #[serde(rename = "contentKey")]
    pub content_key: String,

    #[serde(rename = "apiVersion")]
    pub api_version: String,

    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            products_index: "products-index".to_string(),
            policy_index: "regulamin-index".to_string(),
            content_key: "content".to_string(),
            api_version: "2023-11-01".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Inventory store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventorySettings {
    /// SQLite database file holding the `stock` table
    pub database: PathBuf,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            database: PathBuf::from("data/stock.db"),
        }
    }
}

/// Tunables of the answering pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Documents fetched per index for general questions
    #[serde(rename = "generalTopK")]
    pub general_top_k: usize,

    /// Documents fetched per material name
    #[serde(rename = "materialsTopK")]
    pub materials_top_k: usize,

    /// Cross-sell suggestions appended to general answers
    #[serde(rename = "maxAlternatives")]
    pub max_alternatives: usize,

    /// Catalog products listed under each material
    #[serde(rename = "productsPerMaterial")]
    pub products_per_material: usize,

    /// Minimum name/query similarity ratio for the live stock lookup
    #[serde(rename = "stockMatchThreshold")]
    pub stock_match_threshold: f32,

    /// Sampling temperature for classification, synthesis and extraction
    pub temperature: f32,

    /// Keyword overrides for direct stock intents
    pub intents: IntentKeywords,
}

/// Direct-intent keywords, matched as whole words; a trailing `*` matches a
/// word stem. An unset list keeps the built-in vocabulary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentKeywords {
    pub restock: Option<Vec<String>>,
    pub availability: Option<Vec<String>>,
    pub purchase: Option<Vec<String>>,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            general_top_k: 3,
            materials_top_k: 5,
            max_alternatives: 3,
            products_per_material: 2,
            stock_match_threshold: 0.5,
            temperature: 0.0,
            intents: IntentKeywords::default(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub catalog: Option<PathBuf>,
    #[serde(rename = "promptsDir")]
    pub prompts_dir: Option<PathBuf>,
    pub logging: Option<LoggingConfig>,
    pub server: Option<ServerSettings>,
    pub llm: Option<LlmSettings>,
    pub search: Option<SearchSettings>,
    pub inventory: Option<InventorySettings>,
    pub rag: Option<RagSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
    pub color: Option<bool>,
}

/// Local settings file in the Azure Functions layout.
#[derive(Debug, Deserialize)]
struct LocalSettings {
    #[serde(rename = "Values", default)]
    values: HashMap<String, serde_json::Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            catalog_path: PathBuf::from("data/products.json"),
            prompts_dir: None,
            log_level: None,
            log_json: false,
            verbose: false,
            no_color: false,
            server: ServerSettings::default(),
            llm: LlmSettings::default(),
            search: SearchSettings::default(),
            inventory: InventorySettings::default(),
            rag: RagSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources.
    ///
    /// Environment variables:
    /// - `AZURE_FOUNDRY_ENDPOINT`, `AZURE_FOUNDRY_KEY`: chat model endpoint and key
    /// - `AZURE_OPENAI_CHAT_DEPLOYMENT`: chat model deployment
    /// - `AZURE_SEARCH_ENDPOINT`, `AZURE_SEARCH_KEY`: search service
    /// - `HURTBOT_PRODUCTS_INDEX`, `HURTBOT_POLICY_INDEX`: index names
    /// - `SQL_CONNECTION_STRING`: SQLite stock database path
    /// - `HURTBOT_LLM_PROVIDER`: "azure" or "ollama"
    /// - `HURTBOT_CATALOG`: product catalog path
    /// - `HURTBOT_PROMPTS_DIR`: prompt override directory
    /// - `HURTBOT_HOST`, `HURTBOT_PORT`: HTTP bind address
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use hurtbot_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// config.validate().expect("Invalid config");
    /// ```
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        // A missing .env is normal; existing variables are never overwritten.
        let _ = dotenvy::dotenv();

        let mut vars = load_local_settings(Path::new(LOCAL_SETTINGS_FILE))?;
        vars.extend(std::env::vars());

        let (path, file) = match config_file {
            Some(path) => (Some(path.to_path_buf()), Some(read_config_file(path)?)),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    let file = read_config_file(&default_path)?;
                    (Some(default_path), Some(file))
                } else {
                    (None, None)
                }
            }
        };

        let mut config = Self::from_sources(file, &vars)?;
        config.config_file = path;
        Ok(config)
    }

    /// Build a configuration from an optional config file and a variable map.
    ///
    /// Variables win over the file; the file wins over defaults.
    pub fn from_sources(file: Option<ConfigFile>, vars: &HashMap<String, String>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(file) = file {
            config.merge_file(file);
        }

        config.merge_vars(vars)?;
        Ok(config)
    }

    fn merge_file(&mut self, file: ConfigFile) {
        if let Some(catalog) = file.catalog {
            self.catalog_path = catalog;
        }
        if let Some(dir) = file.prompts_dir {
            self.prompts_dir = Some(dir);
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(json) = logging.json {
                self.log_json = json;
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }
        if let Some(server) = file.server {
            self.server = server;
        }
        if let Some(llm) = file.llm {
            self.llm = llm;
        }
        if let Some(search) = file.search {
            self.search = search;
        }
        if let Some(inventory) = file.inventory {
            self.inventory = inventory;
        }
        if let Some(rag) = file.rag {
            self.rag = rag;
        }
    }

    fn merge_vars(&mut self, vars: &HashMap<String, String>) -> AppResult<()> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(provider) = get("HURTBOT_LLM_PROVIDER") {
            self.llm.provider = provider.to_lowercase();
        }
        if let Some(endpoint) = get("AZURE_FOUNDRY_ENDPOINT") {
            self.llm.endpoint = Some(endpoint);
        }
        if let Some(key) = get("AZURE_FOUNDRY_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = get("AZURE_OPENAI_CHAT_DEPLOYMENT") {
            self.llm.model = Some(model);
        }

        if let Some(endpoint) = get("AZURE_SEARCH_ENDPOINT") {
            self.search.endpoint = Some(endpoint);
        }
        if let Some(key) = get("AZURE_SEARCH_KEY") {
            self.search.api_key = Some(key);
        }
        if let Some(index) = get("HURTBOT_PRODUCTS_INDEX") {
            self.search.products_index = index;
        }
        if let Some(index) = get("HURTBOT_POLICY_INDEX") {
            self.search.policy_index = index;
        }

        if let Some(database) = get("SQL_CONNECTION_STRING") {
            self.inventory.database = PathBuf::from(database);
        }
        if let Some(catalog) = get("HURTBOT_CATALOG") {
            self.catalog_path = PathBuf::from(catalog);
        }
        if let Some(dir) = get("HURTBOT_PROMPTS_DIR") {
            self.prompts_dir = Some(PathBuf::from(dir));
        }

        if let Some(host) = get("HURTBOT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("HURTBOT_PORT") {
            self.server.port = port.parse().map_err(|e| {
                AppError::Config(format!("Invalid HURTBOT_PORT '{}': {}", port, e))
            })?;
        }

        if let Some(level) = get("RUST_LOG") {
            self.log_level = Some(level);
        }
        if vars.contains_key("NO_COLOR") {
            self.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over every other source.
    pub fn with_overrides(
        mut self,
        catalog: Option<PathBuf>,
        log_level: Option<String>,
        log_json: bool,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(catalog) = catalog {
            self.catalog_path = catalog;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if log_json {
            self.log_json = true;
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Names of required keys that are not set, in a stable order.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.llm.provider == "azure" {
            if self.llm.endpoint.is_none() {
                missing.push("AZURE_FOUNDRY_ENDPOINT");
            }
            if self.llm.api_key.is_none() {
                missing.push("AZURE_FOUNDRY_KEY");
            }
            if self.llm.model.is_none() {
                missing.push("AZURE_OPENAI_CHAT_DEPLOYMENT");
            }
        }

        if self.search.endpoint.is_none() {
            missing.push("AZURE_SEARCH_ENDPOINT");
        }
        if self.search.api_key.is_none() {
            missing.push("AZURE_SEARCH_KEY");
        }

        missing
    }

    /// Validate the configuration for serving queries.
    ///
    /// All problems are collected and returned as one error.
    pub fn validate(&self) -> AppResult<()> {
        let mut problems = Vec::new();

        if !KNOWN_PROVIDERS.contains(&self.llm.provider.as_str()) {
            problems.push(format!(
                "Unknown provider: {}. Supported: {}",
                self.llm.provider,
                KNOWN_PROVIDERS.join(", ")
            ));
        }

        let missing = self.missing_keys();
        if !missing.is_empty() {
            problems.push(format!(
                "Missing required configuration keys: {}",
                missing.join(", ")
            ));
        }

        if !(0.0..=1.0).contains(&self.rag.stock_match_threshold) {
            problems.push(format!(
                "rag.stockMatchThreshold must be within 0.0..=1.0, got {}",
                self.rag.stock_match_threshold
            ));
        }

        if self.rag.max_alternatives > MAX_ALTERNATIVES_LIMIT {
            problems.push(format!(
                "rag.maxAlternatives must be at most {}, got {}",
                MAX_ALTERNATIVES_LIMIT, self.rag.max_alternatives
            ));
        }

        if !(0.0..=2.0).contains(&self.rag.temperature) {
            problems.push(format!(
                "rag.temperature must be within 0.0..=2.0, got {}",
                self.rag.temperature
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::Config(problems.join("; ")))
        }
    }
}

/// Read and parse a YAML config file.
pub fn read_config_file(path: &Path) -> AppResult<ConfigFile> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;

    serde_yaml::from_str(&contents)
        .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
}

/// Read the `Values` map of an Azure Functions `local.settings.json`.
///
/// A missing file yields an empty map.
pub fn load_local_settings(path: &Path) -> AppResult<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let contents = std::fs::read_to_string(path)?;
    let settings: LocalSettings = serde_json::from_str(&contents).map_err(|e| {
        AppError::Config(format!("Failed to parse local settings {:?}: {}", path, e))
    })?;

    Ok(settings
        .values
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}
