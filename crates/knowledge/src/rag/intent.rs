//! Direct product intents.
//!
//! A query naming a catalog product together with a restock, availability or
//! purchase keyword is answered straight from the inventory store, without
//! retrieval or the chat model.

use crate::rag::ask::Assistant;
use crate::rag::types::{Answer, AnswerKind};
use crate::types::{Decrement, Increment, Product};
use hurtbot_core::{AppError, AppResult, IntentKeywords};
use regex::Regex;
use std::sync::LazyLock;

/// First number in a query, with an optional unit.
static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(?:szt\.?|sztuk\w*|kg|m2|m²|m3|m³|m|l|opak\.?|work\w*|palet\w*)?").unwrap()
});

/// Stock operation requested by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Restock,
    Availability,
    Purchase,
}

/// Built-in keywords. A trailing `*` matches any word starting with the stem.
const RESTOCK_WORDS: [&str; 9] = [
    "dostarczono",
    "dostarczyli",
    "przyjęto",
    "dodaj",
    "uzupełnij",
    "delivered",
    "add",
    "replenish",
    "restock",
];
const AVAILABILITY_WORDS: [&str; 6] = [
    "dostępn*",
    "na stanie",
    "w magazynie",
    "ile macie",
    "available",
    "in stock",
];
const PURCHASE_WORDS: [&str; 5] = ["kupuję", "kupię", "kup", "zamawiam", "buy"];

static BUILTIN_VOCABULARY: LazyLock<IntentVocabulary> = LazyLock::new(|| {
    IntentVocabulary::new(&RESTOCK_WORDS, &AVAILABILITY_WORDS, &PURCHASE_WORDS).unwrap()
});

/// One keyword list compiled to a single pattern. Keywords match whole
/// words only, so `add` never fires inside `address`.
#[derive(Debug, Clone)]
struct KeywordSet(Option<Regex>);

impl KeywordSet {
    fn compile<S: AsRef<str>>(words: &[S]) -> AppResult<Self> {
        let alternatives: Vec<String> = words
            .iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty() && w != "*")
            .map(|w| match w.strip_suffix('*') {
                Some(stem) => format!(r"(?:^|\W){}", regex::escape(stem)),
                None => format!(r"(?:^|\W){}(?:\W|$)", regex::escape(&w)),
            })
            .collect();

        if alternatives.is_empty() {
            return Ok(Self(None));
        }

        Regex::new(&alternatives.join("|"))
            .map(|re| Self(Some(re)))
            .map_err(|e| AppError::Config(format!("Invalid intent keywords: {}", e)))
    }

    fn matches(&self, text: &str) -> bool {
        self.0.as_ref().is_some_and(|re| re.is_match(text))
    }
}

/// Keywords recognised per intent, matched against the lowercased query.
#[derive(Debug, Clone)]
pub struct IntentVocabulary {
    restock: KeywordSet,
    availability: KeywordSet,
    purchase: KeywordSet,
}

impl Default for IntentVocabulary {
    fn default() -> Self {
        BUILTIN_VOCABULARY.clone()
    }
}

impl IntentVocabulary {
    pub fn new<S: AsRef<str>>(restock: &[S], availability: &[S], purchase: &[S]) -> AppResult<Self> {
        Ok(Self {
            restock: KeywordSet::compile(restock)?,
            availability: KeywordSet::compile(availability)?,
            purchase: KeywordSet::compile(purchase)?,
        })
    }

    /// Built-in vocabulary with any configured lists swapped in.
    pub fn from_keywords(keywords: &IntentKeywords) -> AppResult<Self> {
        let pick = |configured: &Option<Vec<String>>, builtin: &[&str]| -> AppResult<KeywordSet> {
            match configured {
                Some(words) => KeywordSet::compile(words.as_slice()),
                None => KeywordSet::compile(builtin),
            }
        };

        Ok(Self {
            restock: pick(&keywords.restock, &RESTOCK_WORDS)?,
            availability: pick(&keywords.availability, &AVAILABILITY_WORDS)?,
            purchase: pick(&keywords.purchase, &PURCHASE_WORDS)?,
        })
    }

    /// Intent carried by a lowercased query. Restock wins over availability,
    /// availability over purchase.
    pub fn detect(&self, query: &str) -> Option<Intent> {
        if self.restock.matches(query) {
            Some(Intent::Restock)
        } else if self.availability.matches(query) {
            Some(Intent::Availability)
        } else if self.purchase.matches(query) {
            Some(Intent::Purchase)
        } else {
            None
        }
    }
}

/// First integer in `text`, if it fits a stock quantity.
pub fn extract_quantity(text: &str) -> Option<u32> {
    QUANTITY_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

impl Assistant {
    /// Answer a literal stock operation on a named product, if the query is one.
    ///
    /// Inventory errors propagate to the caller.
    pub fn try_direct_intent(&self, query: &str) -> AppResult<Option<Answer>> {
        let query_lower = query.to_lowercase();

        for product in self.catalog.products() {
            let name = product.name.to_lowercase();
            if name.trim().is_empty() || !query_lower.contains(&name) {
                continue;
            }

            let Some(intent) = self.vocabulary.detect(&query_lower) else {
                continue;
            };

            tracing::info!("Direct intent {:?} for product {}", intent, product.id);
            let remainder = query_lower.replace(&name, " ");
            let text = self.apply_intent(intent, product, &remainder)?;
            return Ok(Some(Answer::new(AnswerKind::Inventory, text)));
        }

        Ok(None)
    }

    fn apply_intent(&self, intent: Intent, product: &Product, remainder: &str) -> AppResult<String> {
        match intent {
            Intent::Restock => {
                let Some(amount) = extract_quantity(remainder) else {
                    return Ok(format!(
                        "Nie rozpoznano ilości dla produktu {}. Podaj liczbę sztuk, np. \"dostarczono 10 szt.\"",
                        product.name
                    ));
                };

                let default_price = product.price.unwrap_or(0.0);
                Ok(
                    match self.inventory.increment(&product.id, amount, default_price)? {
                        Increment::Added(record) => format!(
                            "Przyjęto dostawę {} szt. produktu {}. Aktualny stan: {} szt.",
                            amount, product.name, record.quantity
                        ),
                        Increment::Overflow => format!(
                            "Nie można przyjąć dostawy {} szt. produktu {}: stan magazynowy przekroczyłby dopuszczalny limit.",
                            amount, product.name
                        ),
                    },
                )
            }
            Intent::Availability => {
                let quantity = self
                    .inventory
                    .get(&product.id)?
                    .map_or(0, |record| record.quantity);

                Ok(if quantity > 0 {
                    format!(
                        "Produkt {} jest dostępny: {} szt. w magazynie.",
                        product.name, quantity
                    )
                } else {
                    format!(
                        "Produkt {} jest obecnie niedostępny (brak w magazynie).",
                        product.name
                    )
                })
            }
            Intent::Purchase => Ok(match self.inventory.decrement_one(&product.id)? {
                Decrement::SoldOut => format!("Produkt {} jest wyprzedany.", product.name),
                Decrement::Remaining(left) => format!(
                    "Sprzedano 1 szt. produktu {}. Pozostało w magazynie: {} szt.",
                    product.name, left
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InventoryStore;
    use crate::rag::test_support::{assistant, TestParts};

    #[test]
    fn test_detect_order() {
        let vocabulary = IntentVocabulary::default();
        assert_eq!(vocabulary.detect("dostarczono 5 szt."), Some(Intent::Restock));
        assert_eq!(vocabulary.detect("czy jest dostępny"), Some(Intent::Availability));
        assert_eq!(vocabulary.detect("kupuję dwa"), Some(Intent::Purchase));
        assert_eq!(vocabulary.detect("ile kosztuje"), None);
    }

    #[test]
    fn test_keywords_match_whole_words() {
        let vocabulary = IntentVocabulary::default();
        assert_eq!(vocabulary.detect("shipping address for cement"), None);
        assert_eq!(vocabulary.detect("czy dostawa cementu jest darmowa?"), None);
        assert_eq!(vocabulary.detect("add 5 cement"), Some(Intent::Restock));
        assert_eq!(vocabulary.detect("kup cement"), Some(Intent::Purchase));
        assert_eq!(vocabulary.detect("kupon na cement"), None);
        assert_eq!(vocabulary.detect("cement dostępny?"), Some(Intent::Availability));
    }

    #[test]
    fn test_delivery_questions_fall_through() {
        let parts = TestParts::default();
        parts.inventory.set("P1", 10, 32.5).unwrap();
        let inventory = parts.inventory.clone();
        let assistant = assistant(parts);

        for query in [
            "Ile kosztuje dostawa 5 worków cementu?",
            "Czy dostawa cementu jest darmowa?",
        ] {
            assert!(assistant.try_direct_intent(query).unwrap().is_none(), "{}", query);
        }
        assert_eq!(inventory.get("P1").unwrap().unwrap().quantity, 10);
    }

    #[test]
    fn test_restock_past_counter_limit_keeps_record_readable() {
        let parts = TestParts::default();
        let inventory = parts.inventory.clone();
        let assistant = assistant(parts);

        let first = assistant
            .try_direct_intent("dostarczono 4000000000 szt. cement")
            .unwrap()
            .unwrap();
        assert!(first.text.contains("Aktualny stan: 4000000000 szt."));

        let second = assistant
            .try_direct_intent("dostarczono 4000000000 szt. cement")
            .unwrap()
            .unwrap();
        assert!(second.text.starts_with("Nie można przyjąć dostawy"));
        assert_eq!(inventory.get("P1").unwrap().unwrap().quantity, 4_000_000_000);

        let availability = assistant
            .try_direct_intent("Czy cement jest na stanie?")
            .unwrap()
            .unwrap();
        assert!(availability.text.contains("4000000000 szt."));
    }

    #[test]
    fn test_configured_keywords_replace_one_list() {
        let keywords = IntentKeywords {
            purchase: Some(vec!["Biorę".to_string()]),
            ..IntentKeywords::default()
        };
        let vocabulary = IntentVocabulary::from_keywords(&keywords).unwrap();

        assert_eq!(vocabulary.detect("biorę cement"), Some(Intent::Purchase));
        assert_eq!(vocabulary.detect("kupuję cement"), None);
        assert_eq!(vocabulary.detect("dostarczono 5"), Some(Intent::Restock));
    }

    #[test]
    fn test_extract_quantity() {
        assert_eq!(extract_quantity("dostarczono 25 szt."), Some(25));
        assert_eq!(extract_quantity("dostawa: 12 worków"), Some(12));
        assert_eq!(extract_quantity("dostawa bez liczby"), None);
        assert_eq!(extract_quantity("99999999999 szt"), None);
    }

    #[test]
    fn test_restock_adds_parsed_amount() {
        let parts = TestParts::default();
        parts.inventory.set("P1", 7, 32.5).unwrap();
        let inventory = parts.inventory.clone();
        let assistant = assistant(parts);

        let answer = assistant
            .try_direct_intent("Dostarczono 15 szt. Cement")
            .unwrap()
            .unwrap();
        assert_eq!(answer.kind, AnswerKind::Inventory);
        assert!(answer.text.contains("Aktualny stan: 22 szt."));
        assert_eq!(inventory.get("P1").unwrap().unwrap().quantity, 22);
    }

    #[test]
    fn test_restock_creates_record_with_catalog_price() {
        let parts = TestParts::default();
        let inventory = parts.inventory.clone();
        let assistant = assistant(parts);

        assistant.try_direct_intent("dodaj 3 cement").unwrap().unwrap();
        let record = inventory.get("P1").unwrap().unwrap();
        assert_eq!(record.quantity, 3);
        assert_eq!(record.price, 32.5);
    }

    #[test]
    fn test_restock_ignores_digits_in_product_name() {
        let parts = TestParts::default();
        let inventory = parts.inventory.clone();
        let assistant = assistant(parts);

        let answer = assistant
            .try_direct_intent("Dostarczono: klej c2 4 worki")
            .unwrap()
            .unwrap();
        assert!(answer.text.contains("Aktualny stan: 4 szt."));
        assert_eq!(inventory.get("P3").unwrap().unwrap().quantity, 4);
    }

    #[test]
    fn test_restock_without_number() {
        let assistant = assistant(TestParts::default());
        let answer = assistant
            .try_direct_intent("dostarczono cement")
            .unwrap()
            .unwrap();
        assert!(answer.text.starts_with("Nie rozpoznano ilości"));
    }

    #[test]
    fn test_availability() {
        let parts = TestParts::default();
        parts.inventory.set("P1", 9, 32.5).unwrap();
        let assistant = assistant(parts);

        let answer = assistant
            .try_direct_intent("Czy cement jest na stanie?")
            .unwrap()
            .unwrap();
        assert!(answer.text.contains("9 szt."));

        let answer = assistant
            .try_direct_intent("Farba akrylowa dostępna?")
            .unwrap()
            .unwrap();
        assert!(answer.text.contains("niedostępny"));
    }

    #[test]
    fn test_purchase_decrements_one_unit() {
        let parts = TestParts::default();
        parts.inventory.set("P1", 3, 32.5).unwrap();
        let inventory = parts.inventory.clone();
        let assistant = assistant(parts);

        let answer = assistant.try_direct_intent("Kupuję cement").unwrap().unwrap();
        assert!(answer.text.contains("Pozostało w magazynie: 2 szt."));
        assert_eq!(inventory.get("P1").unwrap().unwrap().quantity, 2);
    }

    #[test]
    fn test_purchase_on_zero_stock_is_sold_out() {
        let parts = TestParts::default();
        parts.inventory.set("P1", 0, 32.5).unwrap();
        let inventory = parts.inventory.clone();
        let assistant = assistant(parts);

        let answer = assistant.try_direct_intent("kup cement").unwrap().unwrap();
        assert!(answer.text.contains("wyprzedany"));
        assert_eq!(inventory.get("P1").unwrap().unwrap().quantity, 0);
    }

    #[test]
    fn test_first_catalog_product_wins() {
        let parts = TestParts::default();
        parts.inventory.set("P1", 1, 32.5).unwrap();
        parts.inventory.set("P2", 5, 40.0).unwrap();
        let assistant = assistant(parts);

        // "cement biały" also contains "cement", which comes first
        let answer = assistant
            .try_direct_intent("czy cement biały jest dostępny")
            .unwrap()
            .unwrap();
        assert!(answer.text.starts_with("Produkt Cement jest dostępny: 1 szt."));
    }

    #[test]
    fn test_no_intent_falls_through() {
        let assistant = assistant(TestParts::default());
        assert!(assistant.try_direct_intent("Ile kosztuje cement?").unwrap().is_none());
        assert!(assistant.try_direct_intent("Jaki jest regulamin?").unwrap().is_none());
    }
}
