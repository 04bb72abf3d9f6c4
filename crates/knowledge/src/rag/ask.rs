//! RAG answering orchestration.
//!
//! [`Assistant::ask`] first tries a direct stock operation on a named
//! product, then classifies the query and hands it to the general or the
//! materials handler.

use crate::catalog::Catalog;
use crate::inventory::InventoryStore;
use crate::rag::intent::IntentVocabulary;
use crate::rag::types::{Answer, QueryKind, INTERNAL_ERROR_MESSAGE};
use crate::retriever::DocumentRetriever;
use crate::types::RetrievedDocument;
use crate::web_search::WebSearch;
use hurtbot_core::{AppResult, RagSettings};
use hurtbot_llm::{LlmClient, LlmRequest};
use hurtbot_prompt::{build_prompt, PromptLibrary};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// Collaborators an [`Assistant`] is built from.
pub struct AssistantParts {
    pub catalog: Arc<Catalog>,
    pub inventory: Arc<dyn InventoryStore>,
    pub retriever: Arc<dyn DocumentRetriever>,
    pub web_search: Arc<dyn WebSearch>,
    pub llm: Arc<dyn LlmClient>,
    pub prompts: Arc<PromptLibrary>,
    /// Model (deployment) name sent with every request
    pub model: String,
    pub settings: RagSettings,
    pub vocabulary: IntentVocabulary,
}

/// The answering pipeline.
pub struct Assistant {
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) inventory: Arc<dyn InventoryStore>,
    pub(crate) retriever: Arc<dyn DocumentRetriever>,
    pub(crate) web_search: Arc<dyn WebSearch>,
    pub(crate) llm: Arc<dyn LlmClient>,
    pub(crate) prompts: Arc<PromptLibrary>,
    pub(crate) model: String,
    pub(crate) settings: RagSettings,
    pub(crate) vocabulary: IntentVocabulary,
}

impl Assistant {
    pub fn new(parts: AssistantParts) -> Self {
        Self {
            catalog: parts.catalog,
            inventory: parts.inventory,
            retriever: parts.retriever,
            web_search: parts.web_search,
            llm: parts.llm,
            prompts: parts.prompts,
            model: parts.model,
            settings: parts.settings,
            vocabulary: parts.vocabulary,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Answer one query. Never fails; errors become a generic message.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn ask(&self, query: &str) -> Answer {
        tracing::info!("Processing query");

        match self.route(query).await {
            Ok(answer) if answer.is_error() => {
                tracing::warn!("Answered with a handler error message");
                answer
            }
            Ok(answer) => {
                tracing::info!("Answered ({:?}, {} chars)", answer.kind, answer.text.len());
                answer
            }
            Err(e) => {
                tracing::error!("Query failed: {:?}", e);
                Answer::error(INTERNAL_ERROR_MESSAGE)
            }
        }
    }

    async fn route(&self, query: &str) -> AppResult<Answer> {
        if let Some(answer) = self.try_direct_intent(query)? {
            return Ok(answer);
        }

        let kind = self.classify(query).await;
        tracing::info!("Query classified as {}", kind);

        Ok(match kind {
            QueryKind::MaterialsCalculation => self.calculate_materials(query).await,
            QueryKind::General => self.handle_general(query).await,
        })
    }

    /// Render a prompt and return the model's trimmed reply.
    pub(crate) async fn complete_prompt(
        &self,
        prompt_id: &str,
        variables: HashMap<String, String>,
        temperature: f32,
    ) -> AppResult<String> {
        let built = build_prompt(self.prompts.get(prompt_id)?, variables)?;
        tracing::debug!(
            "Rendered prompt '{}' with {} variables",
            built.metadata.source_prompt_id,
            built.metadata.resolved_variables.len()
        );

        let request = LlmRequest::new(built.user, self.model.as_str())
            .with_optional_system(built.system)
            .with_temperature(temperature);

        let response = self.llm.complete(&request).await?;
        tracing::debug!(
            "Prompt '{}' answered by {} ({} tokens)",
            built.metadata.source_prompt_id,
            self.llm.provider_name(),
            response.usage.total_tokens
        );

        Ok(response.content.trim().to_string())
    }
}

/// Build context string from documents for the LLM prompt.
pub(crate) fn build_context(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, document)| format!("[Dokument {}]\n{}", i + 1, document.content))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::test_support::{assistant, cement_documents, TestParts};
    use crate::rag::types::AnswerKind;
    use crate::testing::{FailingInventory, ScriptedLlm, StaticRetriever};
    use crate::types::DocumentSource;

    #[test]
    fn test_build_context() {
        let documents = vec![
            RetrievedDocument::new("Pierwszy", DocumentSource::Products),
            RetrievedDocument::new("Drugi", DocumentSource::Policy),
        ];

        let context = build_context(&documents);
        assert!(context.contains("[Dokument 1]\nPierwszy"));
        assert!(context.contains("[Dokument 2]\nDrugi"));
        assert!(context.contains("---"));
    }

    #[tokio::test]
    async fn test_direct_intent_skips_classification() {
        let parts = TestParts::default();
        parts.inventory.set("P1", 4, 32.5).unwrap();
        let llm = Arc::clone(&parts.llm);
        let assistant = assistant(parts);

        let answer = assistant.ask("Czy cement jest dostępny?").await;
        assert_eq!(answer.kind, AnswerKind::Inventory);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_general_route() {
        let parts = TestParts {
            llm: Arc::new(
                ScriptedLlm::new()
                    .on("Zapytanie klienta", "general")
                    .on("Dokumenty:", "Tak, mamy cement w workach 25 kg."),
            ),
            retriever: Arc::new(StaticRetriever::new(cement_documents(), Vec::new())),
            ..TestParts::default()
        };
        let assistant = assistant(parts);

        let answer = assistant.ask("Czy macie cos do murowania?").await;
        assert_eq!(answer.kind, AnswerKind::Synthesized);
        assert!(answer.text.starts_with("Tak, mamy cement"));
    }

    #[tokio::test]
    async fn test_materials_route() {
        let parts = TestParts {
            llm: Arc::new(
                ScriptedLlm::new()
                    .on("Zapytanie klienta", "materials_calculation")
                    .on(
                        "Informacje z internetu",
                        r#"{"basic_materials": [{"name": "cement", "quantity": 4, "unit": "worki"}]}"#,
                    ),
            ),
            retriever: Arc::new(StaticRetriever::new(cement_documents(), Vec::new())),
            ..TestParts::default()
        };
        let assistant = assistant(parts);

        let answer = assistant.ask("Chcę wylać wylewkę 10m²").await;
        assert_eq!(answer.kind, AnswerKind::Materials);
        assert!(answer.text.starts_with("KALKULACJA MATERIAŁÓW"));
    }

    #[tokio::test]
    async fn test_inventory_failure_in_direct_intent_is_internal_error() {
        let parts = TestParts {
            inventory_override: Some(Arc::new(FailingInventory)),
            ..TestParts::default()
        };
        let assistant = assistant(parts);

        let answer = assistant.ask("Kupuję cement").await;
        assert_eq!(answer, Answer::error(INTERNAL_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_classifier_failure_falls_back_to_general() {
        let parts = TestParts {
            llm: Arc::new(ScriptedLlm::failing()),
            retriever: Arc::new(StaticRetriever::empty()),
            ..TestParts::default()
        };
        let assistant = assistant(parts);

        let answer = assistant.ask("Jaki jest regulamin zwrotów?").await;
        assert_eq!(answer.kind, AnswerKind::NoDocuments);
    }
}
