//! RAG (Retrieval-Augmented Generation) answering pipeline.
//!
//! - `ask`: the orchestrator and shared prompt completion
//! - `intent`: direct stock operations on named products
//! - `classify`: materials vs. general routing
//! - `general`: retrieval, cross-sell and answer synthesis
//! - `materials`: materials calculation report

pub mod ask;
pub mod classify;
pub mod general;
pub mod intent;
pub mod materials;
pub mod types;

pub use ask::{Assistant, AssistantParts};
pub use intent::{Intent, IntentVocabulary};
pub use types::{
    Answer, AnswerKind, GeneralOutcome, MaterialLine, MaterialsReport, ProductOffer, QueryKind,
};

#[cfg(test)]
pub(crate) mod test_support {
    use super::{Assistant, AssistantParts, IntentVocabulary};
    use crate::catalog::Catalog;
    use crate::inventory::{InventoryStore, SqliteInventory};
    use crate::testing::{ScriptedLlm, StaticRetriever, StaticWebSearch};
    use crate::types::{DocumentSource, Product, RetrievedDocument};
    use hurtbot_core::RagSettings;
    use hurtbot_prompt::PromptLibrary;
    use std::sync::Arc;

    pub struct TestParts {
        pub catalog: Catalog,
        pub inventory: Arc<SqliteInventory>,
        pub inventory_override: Option<Arc<dyn InventoryStore>>,
        pub llm: Arc<ScriptedLlm>,
        pub retriever: Arc<StaticRetriever>,
        pub web_search: Arc<StaticWebSearch>,
        pub settings: RagSettings,
        pub prompts: PromptLibrary,
    }

    impl Default for TestParts {
        fn default() -> Self {
            Self {
                catalog: sample_catalog(),
                inventory: Arc::new(SqliteInventory::in_memory().unwrap()),
                inventory_override: None,
                llm: Arc::new(ScriptedLlm::new()),
                retriever: Arc::new(StaticRetriever::empty()),
                web_search: Arc::new(StaticWebSearch::new("Płytki, klej, fuga, grunt.")),
                settings: RagSettings::default(),
                prompts: PromptLibrary::builtin().unwrap(),
            }
        }
    }

    pub fn assistant(parts: TestParts) -> Assistant {
        let inventory: Arc<dyn InventoryStore> = match parts.inventory_override {
            Some(inventory) => inventory,
            None => parts.inventory,
        };

        Assistant::new(AssistantParts {
            catalog: Arc::new(parts.catalog),
            inventory,
            retriever: parts.retriever,
            web_search: parts.web_search,
            llm: parts.llm,
            prompts: Arc::new(parts.prompts),
            model: "test-model".to_string(),
            settings: parts.settings,
            vocabulary: IntentVocabulary::default(),
        })
    }

    fn product(id: &str, name: &str, category: &str, price: Option<f64>) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{} - opis", name),
            category: category.to_string(),
            price,
            technical_specs: None,
            extra: Default::default(),
        }
    }

    pub fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            product("P1", "Cement", "Cementy", Some(32.5)),
            product("P2", "Cement biały", "Cementy", Some(40.0)),
            product("P3", "Klej C2", "Chemia budowlana", Some(45.0)),
            product("P4", "Cement murarski", "Cementy", Some(28.0)),
            product("P5", "Cement szybkowiążący", "Cementy", Some(36.0)),
            product("P6", "Cement hydrauliczny", "Cementy", Some(38.0)),
            product("P7", "Farba akrylowa", "Farby", None),
        ])
        .unwrap()
    }

    pub fn cement_documents() -> Vec<RetrievedDocument> {
        vec![
            RetrievedDocument::new(
                "Cement portlandzki CEM I 42,5R, worek 25 kg",
                DocumentSource::Products,
            )
            .with_id("P1")
            .with_name("Cement")
            .with_category("Cementy"),
            RetrievedDocument::new("Cement biały do fug i tynków", DocumentSource::Products)
                .with_id("P2")
                .with_name("Cement biały")
                .with_category("Cementy"),
        ]
    }
}
