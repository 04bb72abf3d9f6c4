//! Knowledge and answering pipeline for HurtBot.
//!
//! Holds the product catalog, the inventory store, the document retriever,
//! web search, and the RAG pipeline that ties them to the chat model.

pub mod catalog;
pub mod inventory;
pub mod rag;
pub mod retriever;
pub mod types;
pub mod web_search;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use catalog::Catalog;
pub use inventory::{InventoryStore, SqliteInventory};
pub use rag::{Answer, AnswerKind, Assistant, AssistantParts, IntentVocabulary, QueryKind};
pub use retriever::{AzureSearchRetriever, DocumentRetriever, SearchIndex};
pub use types::{
    Decrement, DocumentMetadata, Increment, DocumentSource, MaterialItem, MaterialTier, Product,
    RetrievedDocument, StockRecord,
};
pub use web_search::{DuckDuckGoSearch, WebSearch};
