//! Scripted collaborators for exercising the answering pipeline without
//! network access. Enabled by the `testing` feature.

use crate::inventory::InventoryStore;
use crate::retriever::{DocumentRetriever, SearchIndex};
use crate::types::{Decrement, Increment, RetrievedDocument, StockRecord};
use crate::web_search::WebSearch;
use hurtbot_core::{AppError, AppResult};
use hurtbot_llm::{LlmClient, LlmRequest, LlmResponse};
use std::sync::Mutex;

/// Chat model answering by the first rule whose needle occurs in the prompt.
#[derive(Default)]
pub struct ScriptedLlm {
    rules: Vec<(String, String)>,
    fallback: Option<String>,
    fail: bool,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Reply with `reply` when the user prompt contains `needle`.
    pub fn on(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push((needle.into(), reply.into()));
        self
    }

    /// Reply for prompts no rule matches.
    pub fn otherwise(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(reply.into());
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.requests().len()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if self.fail {
            return Err(AppError::Llm("scripted failure".to_string()));
        }

        self.rules
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .or_else(|| self.fallback.clone())
            .map(|reply| LlmResponse::text(reply, request.model.clone()))
            .ok_or_else(|| AppError::Llm("no scripted reply".to_string()))
    }
}

/// Retriever returning fixed documents per index.
#[derive(Default)]
pub struct StaticRetriever {
    product_rules: Vec<(String, Vec<RetrievedDocument>)>,
    products: Vec<RetrievedDocument>,
    policy: Vec<RetrievedDocument>,
    fail: bool,
    queries: Mutex<Vec<(String, SearchIndex)>>,
}

impl StaticRetriever {
    pub fn new(products: Vec<RetrievedDocument>, policy: Vec<RetrievedDocument>) -> Self {
        Self {
            products,
            policy,
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Product documents for queries containing `needle`, ahead of the fixed list.
    pub fn on(mut self, needle: impl Into<String>, documents: Vec<RetrievedDocument>) -> Self {
        self.product_rules.push((needle.into(), documents));
        self
    }

    /// Queries received so far, with their index.
    pub fn queries(&self) -> Vec<(String, SearchIndex)> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DocumentRetriever for StaticRetriever {
    async fn search(
        &self,
        text: &str,
        top_k: usize,
        index: SearchIndex,
    ) -> AppResult<Vec<RetrievedDocument>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((text.to_string(), index));
        }

        if self.fail {
            return Err(AppError::Retrieval("scripted failure".to_string()));
        }

        let documents = match index {
            SearchIndex::Products => self
                .product_rules
                .iter()
                .find(|(needle, _)| text.contains(needle.as_str()))
                .map_or(&self.products, |(_, documents)| documents),
            SearchIndex::Policy => &self.policy,
        };
        Ok(documents.iter().take(top_k).cloned().collect())
    }
}

/// Web search returning a fixed text, or failing.
pub struct StaticWebSearch {
    result: Option<String>,
}

impl StaticWebSearch {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            result: Some(text.into()),
        }
    }

    pub fn failing() -> Self {
        Self { result: None }
    }
}

#[async_trait::async_trait]
impl WebSearch for StaticWebSearch {
    async fn search(&self, _query: &str) -> AppResult<String> {
        self.result
            .clone()
            .ok_or_else(|| AppError::Search("scripted failure".to_string()))
    }
}

/// Inventory store whose every call fails.
pub struct FailingInventory;

impl InventoryStore for FailingInventory {
    fn get(&self, _product_id: &str) -> AppResult<Option<StockRecord>> {
        Err(AppError::Inventory("scripted failure".to_string()))
    }

    fn set(&self, _product_id: &str, _quantity: u32, _price: f64) -> AppResult<StockRecord> {
        Err(AppError::Inventory("scripted failure".to_string()))
    }

    fn increment(
        &self,
        _product_id: &str,
        _amount: u32,
        _default_price: f64,
    ) -> AppResult<Increment> {
        Err(AppError::Inventory("scripted failure".to_string()))
    }

    fn decrement_one(&self, _product_id: &str) -> AppResult<Decrement> {
        Err(AppError::Inventory("scripted failure".to_string()))
    }

    fn seed(&self, _product_id: &str, _price: f64) -> AppResult<bool> {
        Err(AppError::Inventory("scripted failure".to_string()))
    }
}
