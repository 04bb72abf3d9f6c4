//! Knowledge system type definitions.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier
    pub id: String,

    /// Display name, matched literally by the direct intent handler
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category: String,

    /// Catalog list price in PLN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_specs: Option<serde_json::Map<String, serde_json::Value>>,

    /// Any other catalog fields (subcategory, brand, certifications, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Live stock row for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub product_id: String,
    pub quantity: u32,
    pub price: f64,
}

/// Outcome of a single-unit purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// Quantity was already zero (or no record exists); nothing changed
    SoldOut,
    /// One unit was taken; the remaining quantity
    Remaining(u32),
}

/// Outcome of a restock.
#[derive(Debug, Clone, PartialEq)]
pub enum Increment {
    /// Units were added; the updated record
    Added(StockRecord),
    /// The new quantity would not fit a stock counter; nothing changed
    Overflow,
}

/// Corpus a retrieved document comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    Products,
    Policy,
    Stock,
}

impl DocumentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Policy => "policy",
            Self::Stock => "stock",
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to a retrieved document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    pub source: DocumentSource,
}

/// A document returned by a retriever for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl RetrievedDocument {
    /// Document with only a source tag.
    pub fn new(content: impl Into<String>, source: DocumentSource) -> Self {
        Self {
            content: content.into(),
            metadata: DocumentMetadata {
                id: None,
                name: None,
                category: None,
                source,
            },
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.name = Some(name.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.metadata.category = Some(category.into());
        self
    }

    /// Non-empty category, if any.
    pub fn category(&self) -> Option<&str> {
        self.metadata
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }
}

/// Whether a material is required or merely helpful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialTier {
    Basic,
    Additional,
}

/// One material extracted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialItem {
    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "string_or_number")]
    pub quantity: String,

    #[serde(default)]
    pub unit: String,
}

/// Accept `"10"`, `10` or `2.5` for a quantity.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_keeps_extra_fields() {
        let json = r#"{
            "id": "P001",
            "name": "Cement portlandzki CEM I 42,5R",
            "description": "Worek 25 kg",
            "category": "Cementy",
            "price": 32.5,
            "brand": "Górażdże",
            "technical_specs": {"waga": "25 kg"}
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, Some(32.5));
        assert_eq!(product.extra.get("brand").and_then(|v| v.as_str()), Some("Górażdże"));
        assert!(product.technical_specs.is_some());
    }

    #[test]
    fn test_material_quantity_accepts_numbers() {
        let item: MaterialItem =
            serde_json::from_str(r#"{"name": "klej", "quantity": 12, "unit": "worki"}"#).unwrap();
        assert_eq!(item.quantity, "12");

        let item: MaterialItem =
            serde_json::from_str(r#"{"name": "fuga", "quantity": "2-3", "unit": "kg"}"#).unwrap();
        assert_eq!(item.quantity, "2-3");
    }

    #[test]
    fn test_blank_category_is_none() {
        let doc = RetrievedDocument::new("x", DocumentSource::Products).with_category("  ");
        assert_eq!(doc.category(), None);
    }

    #[test]
    fn test_document_source_serializes_lowercase() {
        let json = serde_json::to_string(&DocumentSource::Policy).unwrap();
        assert_eq!(json, "\"policy\"");
    }
}
