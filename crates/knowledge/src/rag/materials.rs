//! Materials calculation.
//!
//! Chains a web search for a generic materials list, structured extraction by
//! the chat model, product matching against the products index and live
//! stock/price enrichment. Web search and product lookups degrade
//! independently; only an unusable extraction aborts the report.

use crate::rag::ask::Assistant;
use crate::rag::types::{
    Answer, AnswerKind, MaterialLine, MaterialsReport, ProductOffer, MATERIALS_ERROR_MESSAGE,
    SEARCH_FAILED_MESSAGE,
};
use crate::retriever::SearchIndex;
use crate::types::{MaterialItem, MaterialTier, RetrievedDocument};
use hurtbot_core::{AppError, AppResult};
use hurtbot_prompt::MATERIALS_PROMPT_ID;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::LazyLock;

/// JSON object inside a markdown code fence.
static FENCED_JSON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap());

/// Model output for the extraction prompt.
#[derive(Debug, Default, Deserialize)]
pub struct MaterialsExtraction {
    #[serde(default)]
    pub basic_materials: Vec<MaterialItem>,
    #[serde(default)]
    pub additional_materials: Vec<MaterialItem>,
}

impl Assistant {
    /// Materials report for a construction task; failures become a generic message.
    pub async fn calculate_materials(&self, query: &str) -> Answer {
        match self.try_materials(query).await {
            Ok(report) => Answer::new(
                AnswerKind::Materials,
                format_report(&report, self.settings.products_per_material),
            ),
            Err(e) => {
                tracing::error!("Materials calculation failed: {}", e);
                Answer::error(MATERIALS_ERROR_MESSAGE)
            }
        }
    }

    pub async fn try_materials(&self, query: &str) -> AppResult<MaterialsReport> {
        tracing::info!("Calculating materials");

        if !self.prompts.get(MATERIALS_PROMPT_ID)?.output.expects_json() {
            return Err(AppError::Prompt(format!(
                "Prompt '{}' must declare JSON output",
                MATERIALS_PROMPT_ID
            )));
        }

        let search_results = self.search_materials(query).await;

        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.to_string());
        variables.insert("search_results".to_string(), search_results);

        let reply = self
            .complete_prompt(MATERIALS_PROMPT_ID, variables, self.settings.temperature)
            .await?;
        let extraction = parse_extraction(&reply)?;

        tracing::info!(
            "Extracted {} basic and {} additional materials",
            extraction.basic_materials.len(),
            extraction.additional_materials.len()
        );

        Ok(MaterialsReport {
            basic: self
                .match_materials(extraction.basic_materials, MaterialTier::Basic)
                .await,
            additional: self
                .match_materials(extraction.additional_materials, MaterialTier::Additional)
                .await,
        })
    }

    async fn search_materials(&self, query: &str) -> String {
        let search_query = format!("materiały budowlane potrzebne do {} lista ilość", query);

        match self.web_search.search(&search_query).await {
            Ok(results) => {
                tracing::debug!("Web search returned {} chars", results.len());
                results
            }
            Err(e) => {
                tracing::error!("Materials web search failed: {}", e);
                SEARCH_FAILED_MESSAGE.to_string()
            }
        }
    }

    /// Pair each material with the offers found among the tier's products.
    ///
    /// The products retrieved for every material of the tier form one pool;
    /// a material is offered every pooled product whose content mentions it.
    async fn match_materials(&self, items: Vec<MaterialItem>, tier: MaterialTier) -> Vec<MaterialLine> {
        let pool = self.pool_products(&items).await;
        tracing::debug!("{:?} tier: {} pooled products", tier, pool.len());

        items
            .into_iter()
            .map(|item| {
                let offers = self.offers_in(&pool, &item.name);
                tracing::debug!("{:?} material '{}': {} offers", tier, item.name, offers.len());
                MaterialLine { item, offers }
            })
            .collect()
    }

    async fn pool_products(&self, items: &[MaterialItem]) -> Vec<RetrievedDocument> {
        let mut pool: Vec<RetrievedDocument> = Vec::new();

        for item in items {
            let name = item.name.trim();
            if name.is_empty() {
                continue;
            }

            match self
                .retriever
                .search(name, self.settings.materials_top_k, SearchIndex::Products)
                .await
            {
                Ok(documents) => {
                    for document in documents {
                        if !pool.contains(&document) {
                            pool.push(document);
                        }
                    }
                }
                Err(e) => tracing::error!("Product lookup for '{}' failed: {}", name, e),
            }
        }

        pool
    }

    /// Pooled products whose content mentions `material`.
    fn offers_in(&self, pool: &[RetrievedDocument], material: &str) -> Vec<ProductOffer> {
        let needle = material.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        pool.iter()
            .filter(|doc| doc.content.to_lowercase().contains(&needle))
            .map(|doc| self.offer_for(doc))
            .collect()
    }

    fn offer_for(&self, document: &RetrievedDocument) -> ProductOffer {
        let name = document
            .metadata
            .name
            .clone()
            .unwrap_or_else(|| "Produkt".to_string());

        let record = match document.metadata.id.as_deref() {
            Some(id) => self.inventory.get(id).unwrap_or_else(|e| {
                tracing::warn!("Stock lookup for {} failed: {}", id, e);
                None
            }),
            None => None,
        };

        match record {
            Some(record) => ProductOffer {
                name,
                price: Some(record.price),
                quantity: record.quantity,
            },
            None => ProductOffer {
                name,
                price: None,
                quantity: 0,
            },
        }
    }
}

/// Parse the model reply into material lists.
///
/// A fenced JSON block wins; otherwise the span from the first `{` to the
/// last `}` is parsed.
pub fn parse_extraction(reply: &str) -> AppResult<MaterialsExtraction> {
    let fenced = FENCED_JSON_RE
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());

    let json = fenced.or_else(|| brace_span(reply)).ok_or_else(|| {
        AppError::Extraction(format!("No JSON object in model reply: {}", reply))
    })?;

    serde_json::from_str(json)
        .map_err(|e| AppError::Extraction(format!("Invalid materials JSON: {}", e)))
}

fn brace_span(text: &str) -> Option<&str> {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&text[start..=end]),
        _ => None,
    }
}

/// Render the report shown to the customer.
pub fn format_report(report: &MaterialsReport, products_per_material: usize) -> String {
    let mut out = String::from("KALKULACJA MATERIAŁÓW\n\n");

    out.push_str("MATERIAŁY PODSTAWOWE (niezbędne):\n");
    format_section(&mut out, &report.basic, products_per_material);

    if !report.additional.is_empty() {
        out.push_str("MATERIAŁY DODATKOWE (mogą być pomocne):\n");
        format_section(&mut out, &report.additional, products_per_material);
    }

    out.push_str("Potrzebujesz dokładnej wyceny? Skontaktuj się z naszym doradcą!\n");
    out.push_str("Ceny i dostępność sprawdzane w czasie rzeczywistym.");
    out
}

fn format_section(out: &mut String, lines: &[MaterialLine], products_per_material: usize) {
    for line in lines {
        let item = &line.item;
        let _ = writeln!(out, "• {}: {} {}", item.name, item.quantity, item.unit);

        if line.offers.is_empty() {
            out.push_str("  ❌ Produkt niedostępny w naszej ofercie\n");
        } else {
            out.push_str("  Dostępne produkty:\n");
            for offer in line.offers.iter().take(products_per_material) {
                match offer.price {
                    Some(price) => {
                        let availability = if offer.quantity > 0 {
                            "✅ Dostępny"
                        } else {
                            "❌ Brak w magazynie"
                        };
                        let _ = writeln!(
                            out,
                            "    - {}: {:.2} zł ({}, {} szt.)",
                            offer.name, price, availability, offer.quantity
                        );
                    }
                    None => {
                        let _ = writeln!(
                            out,
                            "    - {}: ❌ Brak danych o cenie i dostępności",
                            offer.name
                        );
                    }
                }
            }
        }

        out.push('\n');
    }
}
