//! General-purpose web search.

use hurtbot_core::{AppError, AppResult};
use std::time::Duration;

const DUCKDUCKGO_API_URL: &str = "https://api.duckduckgo.com/";

/// Web search returning a plain text blob for a prompt.
#[async_trait::async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> AppResult<String>;
}

/// DuckDuckGo instant-answer API (no API key).
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    base_url: String,
    max_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        Self::with_base_url(DUCKDUCKGO_API_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("HurtBot/0.1")
            .build()
            .map_err(|e| AppError::Search(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            max_results: 8,
        })
    }
}

#[async_trait::async_trait]
impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> AppResult<String> {
        let url = format!(
            "{}?q={}&format=json&no_html=1&skip_disambig=1",
            self.base_url,
            urlencoding::encode(query)
        );

        tracing::debug!("Web search: {}", query);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Search(format!(
                "Search returned status {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse search response: {}", e)))?;

        let text = flatten_results(&body, self.max_results);
        if text.is_empty() {
            return Err(AppError::Search(format!("No results for \"{}\"", query)));
        }

        Ok(text)
    }
}

/// Abstract plus related topic texts, one per line.
///
/// Nested topic groups (`Topics`) are walked too.
fn flatten_results(body: &serde_json::Value, max_results: usize) -> String {
    let mut lines = Vec::new();

    if let Some(abstract_text) = body.get("AbstractText").and_then(|v| v.as_str()) {
        if !abstract_text.trim().is_empty() {
            lines.push(abstract_text.trim().to_string());
        }
    }

    if let Some(topics) = body.get("RelatedTopics").and_then(|v| v.as_array()) {
        collect_topics(topics, &mut lines, max_results);
    }

    lines.truncate(max_results);
    lines.join("\n")
}

fn collect_topics(topics: &[serde_json::Value], lines: &mut Vec<String>, max_results: usize) {
    for topic in topics {
        if lines.len() >= max_results {
            return;
        }
        if let Some(text) = topic.get("Text").and_then(|v| v.as_str()) {
            if !text.trim().is_empty() {
                lines.push(text.trim().to_string());
            }
        } else if let Some(nested) = topic.get("Topics").and_then(|v| v.as_array()) {
            collect_topics(nested, lines, max_results);
        }
    }
}
