//! Document retrieval over the managed search indices.

use crate::types::{DocumentSource, RetrievedDocument};
use hurtbot_core::config::SearchSettings;
use hurtbot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Logical index a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchIndex {
    /// Product descriptions
    Products,
    /// Shop regulations and policies
    Policy,
}

impl SearchIndex {
    pub fn source(&self) -> DocumentSource {
        match self {
            Self::Products => DocumentSource::Products,
            Self::Policy => DocumentSource::Policy,
        }
    }
}

/// Keyword/semantic search returning the top documents for a text.
#[async_trait::async_trait]
pub trait DocumentRetriever: Send + Sync {
    async fn search(
        &self,
        text: &str,
        top_k: usize,
        index: SearchIndex,
    ) -> AppResult<Vec<RetrievedDocument>>;
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    search: &'a str,
    top: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Azure AI Search REST client.
pub struct AzureSearchRetriever {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    products_index: String,
    policy_index: String,
    content_key: String,
}

impl AzureSearchRetriever {
    /// Create a retriever from search settings.
    ///
    /// # Errors
    /// Returns error if the endpoint or API key is missing or the HTTP
    /// client cannot be built.
    pub fn new(settings: &SearchSettings) -> AppResult<Self> {
        let endpoint = settings
            .endpoint
            .as_deref()
            .ok_or_else(|| AppError::Config("Search endpoint is not set".to_string()))?;
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| AppError::Config("Search API key is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AppError::Retrieval(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            api_version: settings.api_version.clone(),
            products_index: settings.products_index.clone(),
            policy_index: settings.policy_index.clone(),
            content_key: settings.content_key.clone(),
        })
    }

    fn index_name(&self, index: SearchIndex) -> &str {
        match index {
            SearchIndex::Products => &self.products_index,
            SearchIndex::Policy => &self.policy_index,
        }
    }
}

#[async_trait::async_trait]
impl DocumentRetriever for AzureSearchRetriever {
    async fn search(
        &self,
        text: &str,
        top_k: usize,
        index: SearchIndex,
    ) -> AppResult<Vec<RetrievedDocument>> {
        let index_name = self.index_name(index);
        let url = format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint, index_name, self.api_version
        );

        tracing::debug!("Searching index '{}' (top {})", index_name, top_k);

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&SearchRequest {
                search: text,
                top: top_k,
            })
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("Search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Retrieval(format!(
                "Index '{}' returned {}: {}",
                index_name, status, body
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to parse search response: {}", e)))?;

        let documents = parse_documents(body, &self.content_key, index.source());
        tracing::debug!("Index '{}' returned {} documents", index_name, documents.len());
        Ok(documents)
    }
}

fn parse_documents(
    response: SearchResponse,
    content_key: &str,
    source: DocumentSource,
) -> Vec<RetrievedDocument> {
    response
        .value
        .into_iter()
        .map(|hit| {
            let field = |key: &str| match hit.get(key) {
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(serde_json::Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            };

            let mut document = RetrievedDocument::new(field(content_key).unwrap_or_default(), source);
            document.metadata.id = field("id");
            document.metadata.name = field("name");
            document.metadata.category = field("category");
            document
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> Vec<RetrievedDocument> {
        let response: SearchResponse = serde_json::from_value(json).unwrap();
        parse_documents(response, "content", DocumentSource::Products)
    }

    #[test]
    fn test_parse_search_hits() {
        let documents = parse(serde_json::json!({
            "@odata.context": "ignored",
            "value": [
                {
                    "@search.score": 3.2,
                    "id": "P001",
                    "name": "Cement portlandzki",
                    "category": "Cementy",
                    "content": "Cement portlandzki CEM I, worek 25 kg"
                },
                {"id": 7, "content": "Klej do płytek", "category": null}
            ]
        }));

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].metadata.id.as_deref(), Some("P001"));
        assert_eq!(documents[0].metadata.category.as_deref(), Some("Cementy"));
        assert_eq!(documents[0].metadata.source, DocumentSource::Products);
        assert_eq!(documents[1].metadata.id.as_deref(), Some("7"));
        assert_eq!(documents[1].metadata.category, None);
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(parse(serde_json::json!({})).is_empty());
    }

    #[test]
    fn test_new_requires_endpoint_and_key() {
        let settings = SearchSettings::default();
        assert!(matches!(
            AzureSearchRetriever::new(&settings),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_index_names_follow_settings() {
        let settings = SearchSettings {
            endpoint: Some("https://hurt.search.windows.net/".to_string()),
            api_key: Some("key".to_string()),
            ..SearchSettings::default()
        };
        let retriever = AzureSearchRetriever::new(&settings).unwrap();

        assert_eq!(retriever.endpoint, "https://hurt.search.windows.net");
        assert_eq!(retriever.index_name(SearchIndex::Products), "products-index");
        assert_eq!(retriever.index_name(SearchIndex::Policy), "regulamin-index");
    }
}
