//! RAG answer and handler outcome types.

use crate::types::{MaterialItem, Product};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Returned when neither index has a matching document.
pub const NO_DOCUMENTS_MESSAGE: &str = "Nie znaleziono żadnych pasujących dokumentów.";

/// Returned when the general handler hits an upstream failure.
pub const GENERAL_ERROR_MESSAGE: &str = "Wystąpił błąd podczas przetwarzania zapytania.";

/// Used in place of web results when the web search fails.
pub const SEARCH_FAILED_MESSAGE: &str = "Nie udało się wyszukać informacji o materiałach.";

/// Returned when the materials workflow fails.
pub const MATERIALS_ERROR_MESSAGE: &str =
    "Wystąpił błąd podczas kalkulacji materiałów. Spróbuj ponownie.";

/// Returned when an error escapes every handler.
pub const INTERNAL_ERROR_MESSAGE: &str =
    "Wystąpił błąd wewnętrzny podczas przetwarzania zapytania.";

/// Label assigned to a query by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    MaterialsCalculation,
    General,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaterialsCalculation => "materials_calculation",
            Self::General => "general",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which path produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    /// Direct stock operation on a named product
    Inventory,
    /// Model answer over retrieved documents
    Synthesized,
    /// Nothing matched in either index
    NoDocuments,
    /// Materials calculation report
    Materials,
    /// Any failure, with a generic message
    Error,
}

/// Final answer returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub kind: AnswerKind,
    pub text: String,
}

impl Answer {
    pub fn new(kind: AnswerKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(AnswerKind::Error, text)
    }

    pub fn is_error(&self) -> bool {
        self.kind == AnswerKind::Error
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Result of the general handler when no upstream call failed.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneralOutcome {
    /// Both indices came back empty; the model was not called
    NoDocuments,
    /// Synthesized answer plus cross-sell suggestions
    Answered {
        answer: String,
        alternatives: Vec<Product>,
    },
}

impl GeneralOutcome {
    /// Caller-facing answer, with the alternatives block appended.
    pub fn into_answer(self) -> Answer {
        match self {
            Self::NoDocuments => Answer::new(AnswerKind::NoDocuments, NO_DOCUMENTS_MESSAGE),
            Self::Answered {
                answer,
                alternatives,
            } => {
                let mut text = answer;
                if !alternatives.is_empty() {
                    text.push_str("\n\n🔍 Alternatywne produkty w tej samej kategorii:\n");
                    for product in &alternatives {
                        text.push_str(&format!("- {} — {}\n", product.name, product.description));
                    }
                }
                Answer::new(AnswerKind::Synthesized, text)
            }
        }
    }
}

/// Catalog product offered for a material, with live stock data.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductOffer {
    pub name: String,
    /// `None` when no stock record could be read
    pub price: Option<f64>,
    pub quantity: u32,
}

/// One extracted material and the products matched to it.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialLine {
    pub item: MaterialItem,
    pub offers: Vec<ProductOffer>,
}

/// Materials calculation before formatting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialsReport {
    pub basic: Vec<MaterialLine>,
    pub additional: Vec<MaterialLine>,
}
