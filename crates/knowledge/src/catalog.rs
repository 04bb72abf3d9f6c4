//! Static product catalog.
//!
//! Loaded once at startup and shared read-only. Accepts both layouts found in
//! the product data files: a bare JSON array, or an object with a `products`
//! array.

use crate::types::Product;
use hurtbot_core::{AppError, AppResult};
use serde::Deserialize;
use similar::TextDiff;
use std::collections::HashSet;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<Product>),
    Wrapped { products: Vec<Product> },
}

/// In-memory product list in file order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(products: Vec<Product>) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for product in &products {
            if product.id.trim().is_empty() {
                return Err(AppError::Catalog(format!(
                    "Product '{}' has an empty id",
                    product.name
                )));
            }
            if !seen.insert(product.id.as_str()) {
                return Err(AppError::Catalog(format!(
                    "Duplicate product id: {}",
                    product.id
                )));
            }
        }

        Ok(Self { products })
    }

    /// Load the catalog from a JSON file. A file without products is an error.
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Catalog(format!("Failed to read catalog {:?}: {}", path, e))
        })?;

        let catalog = Self::from_json(&contents)
            .map_err(|e| AppError::Catalog(format!("{:?}: {}", path, e)))?;

        if catalog.is_empty() {
            return Err(AppError::Catalog(format!("Catalog {:?} has no products", path)));
        }

        tracing::info!("Loaded {} products from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Parse a catalog from JSON text.
    pub fn from_json(contents: &str) -> AppResult<Self> {
        let file: CatalogFile = serde_json::from_str(contents)
            .map_err(|e| AppError::Catalog(format!("Invalid catalog JSON: {}", e)))?;

        let products = match file {
            CatalogFile::List(products) => products,
            CatalogFile::Wrapped { products } => products,
        };

        Self::new(products)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Up to `max` products in `category`, skipping `exclude_ids`, in catalog order.
    pub fn find_alternatives(
        &self,
        category: &str,
        exclude_ids: &[&str],
        max: usize,
    ) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category == category && !exclude_ids.contains(&p.id.as_str()))
            .take(max)
            .collect()
    }

    /// Product whose name is most similar to `query`, if the ratio reaches `threshold`.
    ///
    /// Ties keep the earlier product.
    pub fn best_match(&self, query: &str, threshold: f32) -> Option<&Product> {
        let query = query.to_lowercase();
        let mut best: Option<(&Product, f32)> = None;

        for product in &self.products {
            let name = product.name.to_lowercase();
            let ratio = TextDiff::from_chars(name.as_str(), query.as_str()).ratio();
            if ratio >= threshold && best.map_or(true, |(_, r)| ratio > r) {
                best = Some((product, ratio));
            }
        }

        if let Some((product, ratio)) = best {
            tracing::debug!("Best catalog match '{}' (ratio {:.2})", product.name, ratio);
        }

        best.map(|(product, _)| product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn product(id: &str, name: &str, category: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("Opis {}", name),
            category: category.to_string(),
            price: Some(10.0),
            technical_specs: None,
            extra: Default::default(),
        }
    }

    fn sample() -> Catalog {
        Catalog::new(vec![
            product("P1", "Cement", "Cementy"),
            product("P2", "Cement biały", "Cementy"),
            product("P3", "Cement szybkowiążący", "Cementy"),
            product("P4", "Cement murarski", "Cementy"),
            product("P5", "Cement hydrauliczny", "Cementy"),
            product("P6", "Farba akrylowa", "Farby"),
        ])
        .unwrap()
    }

    #[test]
    fn test_load_array_layout() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "P1", "name": "Cement", "description": "25 kg", "category": "Cementy"}}]"#
        )
        .unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("P1").unwrap().name, "Cement");
    }

    #[test]
    fn test_load_rejects_empty_file() {
        for contents in ["[]", r#"{"products": []}"#] {
            let mut file = NamedTempFile::new().unwrap();
            write!(file, "{}", contents).unwrap();

            let result = Catalog::load(file.path());
            assert!(
                matches!(&result, Err(AppError::Catalog(msg)) if msg.contains("no products")),
                "{}",
                contents
            );
        }
    }

    #[test]
    fn test_load_wrapped_layout() {
        let catalog = Catalog::from_json(
            r#"{"products": [{"id": "P1", "name": "Cement", "category": "Cementy", "price": 30}]}"#,
        )
        .unwrap();
        assert_eq!(catalog.products()[0].price, Some(30.0));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Catalog::new(vec![
            product("P1", "Cement", "Cementy"),
            product("P1", "Farba", "Farby"),
        ]);
        assert!(matches!(result, Err(AppError::Catalog(msg)) if msg.contains("P1")));
    }

    #[test]
    fn test_invalid_json_is_catalog_error() {
        assert!(matches!(
            Catalog::from_json("{\"items\": 1}"),
            Err(AppError::Catalog(_))
        ));
    }

    #[test]
    fn test_alternatives_exclude_ids_and_respect_max() {
        let catalog = sample();
        let alternatives = catalog.find_alternatives("Cementy", &["P1", "P3"], 3);

        let ids: Vec<&str> = alternatives.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P2", "P4", "P5"]);
    }

    #[test]
    fn test_alternatives_unknown_category() {
        assert!(sample().find_alternatives("Drewno", &[], 3).is_empty());
    }

    #[test]
    fn test_best_match_threshold() {
        let catalog = sample();
        assert_eq!(catalog.best_match("farba akrylowa", 0.5).unwrap().id, "P6");
        assert!(catalog.best_match("regulamin zwrotów towaru", 0.9).is_none());
    }
}
