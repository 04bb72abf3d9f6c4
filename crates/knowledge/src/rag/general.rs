//! General questions: retrieval over both indices plus answer synthesis.

use crate::rag::ask::{build_context, Assistant};
use crate::rag::types::{Answer, GeneralOutcome, GENERAL_ERROR_MESSAGE};
use crate::retriever::SearchIndex;
use crate::types::{DocumentSource, Product, RetrievedDocument};
use hurtbot_core::AppResult;
use hurtbot_prompt::GENERAL_ANSWER_PROMPT_ID;
use std::collections::HashMap;

impl Assistant {
    /// Answer a general question; upstream failures become a generic message.
    pub async fn handle_general(&self, query: &str) -> Answer {
        match self.try_general(query).await {
            Ok(outcome) => outcome.into_answer(),
            Err(e) => {
                tracing::error!("General query failed: {}", e);
                Answer::error(GENERAL_ERROR_MESSAGE)
            }
        }
    }

    /// Retrieve, enrich and synthesize.
    ///
    /// Returns [`GeneralOutcome::NoDocuments`] without calling the model when
    /// both indices come back empty.
    pub async fn try_general(&self, query: &str) -> AppResult<GeneralOutcome> {
        let top_k = self.settings.general_top_k;
        let product_docs = self
            .retriever
            .search(query, top_k, SearchIndex::Products)
            .await?;
        let policy_docs = self
            .retriever
            .search(query, top_k, SearchIndex::Policy)
            .await?;

        tracing::info!(
            "Retrieved {} product and {} policy documents",
            product_docs.len(),
            policy_docs.len()
        );

        if product_docs.is_empty() && policy_docs.is_empty() {
            return Ok(GeneralOutcome::NoDocuments);
        }

        let alternatives = self.find_alternatives(&product_docs);

        let mut documents = product_docs;
        documents.extend(policy_docs);
        if let Some(stock) = self.stock_document(query) {
            documents.push(stock);
        }

        let mut variables = HashMap::new();
        variables.insert("context".to_string(), build_context(&documents));
        variables.insert("question".to_string(), query.to_string());

        let answer = self
            .complete_prompt(GENERAL_ANSWER_PROMPT_ID, variables, self.settings.temperature)
            .await?;

        Ok(GeneralOutcome::Answered {
            answer,
            alternatives,
        })
    }

    /// Catalog products sharing the category of the top product hits.
    fn find_alternatives(&self, product_docs: &[RetrievedDocument]) -> Vec<Product> {
        let Some((category_doc, category)) = product_docs
            .iter()
            .find_map(|doc| doc.category().map(|c| (doc, c)))
        else {
            return Vec::new();
        };

        let mut exclude: Vec<&str> = Vec::new();
        if let Some(id) = product_docs.first().and_then(|d| d.metadata.id.as_deref()) {
            exclude.push(id);
        }
        if let Some(id) = category_doc.metadata.id.as_deref() {
            exclude.push(id);
        }

        let alternatives: Vec<Product> = self
            .catalog
            .find_alternatives(category, &exclude, self.settings.max_alternatives)
            .into_iter()
            .cloned()
            .collect();

        tracing::debug!(
            "Found {} alternatives in category '{}'",
            alternatives.len(),
            category
        );
        alternatives
    }

    /// Live stock of the catalog product the query most resembles.
    fn stock_document(&self, query: &str) -> Option<RetrievedDocument> {
        let product = self
            .catalog
            .best_match(query, self.settings.stock_match_threshold)?;

        match self.inventory.get(&product.id) {
            Ok(Some(record)) => Some(
                RetrievedDocument::new(
                    format!(
                        "Stan magazynowy produktu {}: {} szt., cena {:.2} zł",
                        product.name, record.quantity, record.price
                    ),
                    DocumentSource::Stock,
                )
                .with_id(product.id.clone())
                .with_name(product.name.clone())
                .with_category(product.category.clone()),
            ),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Skipping stock lookup for {}: {}", product.id, e);
                None
            }
        }
    }
}
