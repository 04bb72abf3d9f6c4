//! SQLite-backed inventory store.

use crate::types::{Decrement, Increment, StockRecord};
use hurtbot_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Live stock keyed by product id.
///
/// Mutations are single statements so concurrent callers never lose an
/// update and quantity never drops below zero.
pub trait InventoryStore: Send + Sync {
    /// Current record for a product.
    fn get(&self, product_id: &str) -> AppResult<Option<StockRecord>>;

    /// Insert or overwrite a record.
    fn set(&self, product_id: &str, quantity: u32, price: f64) -> AppResult<StockRecord>;

    /// Add `amount` units, creating the record with `default_price` if absent.
    ///
    /// A sum past `u32::MAX` is refused and leaves the record untouched.
    fn increment(&self, product_id: &str, amount: u32, default_price: f64)
        -> AppResult<Increment>;

    /// Take one unit if any is left.
    fn decrement_one(&self, product_id: &str) -> AppResult<Decrement>;

    /// Create a zero-quantity record if none exists. Returns whether one was created.
    fn seed(&self, product_id: &str, price: f64) -> AppResult<bool>;
}

/// Inventory store over one SQLite connection.
pub struct SqliteInventory {
    conn: Mutex<Connection>,
}

impl SqliteInventory {
    /// Open (or create) the stock database at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Inventory(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Inventory(format!("Failed to open stock database: {}", e)))?;

        tracing::debug!("Opened stock database at {:?}", db_path);
        Self::with_connection(conn)
    }

    /// Private in-memory database.
    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Inventory(format!("Failed to open in-memory database: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS stock (
                product_id TEXT PRIMARY KEY,
                quantity INTEGER NOT NULL CHECK (quantity BETWEEN 0 AND 4294967295),
                price REAL NOT NULL DEFAULT 0
            );
            "#,
        )
        .map_err(|e| AppError::Inventory(format!("Failed to create stock table: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Inventory("Stock database lock poisoned".to_string()))
    }
}

impl InventoryStore for SqliteInventory {
    fn get(&self, product_id: &str) -> AppResult<Option<StockRecord>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT quantity, price FROM stock WHERE product_id = ?1",
            params![product_id],
            |row| {
                Ok(StockRecord {
                    product_id: product_id.to_string(),
                    quantity: row.get(0)?,
                    price: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(|e| AppError::Inventory(format!("Failed to read stock for {}: {}", product_id, e)))
    }

    fn set(&self, product_id: &str, quantity: u32, price: f64) -> AppResult<StockRecord> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO stock (product_id, quantity, price) VALUES (?1, ?2, ?3)
             ON CONFLICT(product_id) DO UPDATE SET quantity = excluded.quantity, price = excluded.price",
            params![product_id, quantity, price],
        )
        .map_err(|e| AppError::Inventory(format!("Failed to set stock for {}: {}", product_id, e)))?;

        tracing::info!("Stock set: {} = {} @ {:.2}", product_id, quantity, price);
        Ok(StockRecord {
            product_id: product_id.to_string(),
            quantity,
            price,
        })
    }

    fn increment(
        &self,
        product_id: &str,
        amount: u32,
        default_price: f64,
    ) -> AppResult<Increment> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                "INSERT INTO stock (product_id, quantity, price) VALUES (?1, ?2, ?3)
                 ON CONFLICT(product_id) DO UPDATE SET quantity = stock.quantity + excluded.quantity
                 WHERE stock.quantity + excluded.quantity <= ?4
                 RETURNING quantity, price",
                params![product_id, amount, default_price, u32::MAX],
                |row| {
                    Ok(StockRecord {
                        product_id: product_id.to_string(),
                        quantity: row.get(0)?,
                        price: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(|e| {
                AppError::Inventory(format!("Failed to increment stock for {}: {}", product_id, e))
            })?;

        Ok(match record {
            Some(record) => {
                tracing::info!("Stock +{}: {} now {}", amount, product_id, record.quantity);
                Increment::Added(record)
            }
            None => {
                tracing::warn!("Stock +{} for {} refused: counter overflow", amount, product_id);
                Increment::Overflow
            }
        })
    }

    fn decrement_one(&self, product_id: &str) -> AppResult<Decrement> {
        let conn = self.lock()?;
        let remaining: Option<u32> = conn
            .query_row(
                "UPDATE stock SET quantity = quantity - 1
                 WHERE product_id = ?1 AND quantity > 0
                 RETURNING quantity",
                params![product_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| {
                AppError::Inventory(format!("Failed to decrement stock for {}: {}", product_id, e))
            })?;

        Ok(match remaining {
            Some(quantity) => {
                tracing::info!("Stock -1: {} now {}", product_id, quantity);
                Decrement::Remaining(quantity)
            }
            None => Decrement::SoldOut,
        })
    }

    fn seed(&self, product_id: &str, price: f64) -> AppResult<bool> {
        let conn = self.lock()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO stock (product_id, quantity, price) VALUES (?1, 0, ?2)",
                params![product_id, price],
            )
            .map_err(|e| {
                AppError::Inventory(format!("Failed to seed stock for {}: {}", product_id, e))
            })?;

        Ok(inserted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_get_missing_record() {
        let store = SqliteInventory::in_memory().unwrap();
        assert!(store.get("P1").unwrap().is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let store = SqliteInventory::in_memory().unwrap();
        store.set("P1", 5, 10.0).unwrap();
        store.set("P1", 2, 12.5).unwrap();

        let record = store.get("P1").unwrap().unwrap();
        assert_eq!(record.quantity, 2);
        assert_eq!(record.price, 12.5);
    }

    #[test]
    fn test_increment_adds_to_prior_quantity() {
        let store = SqliteInventory::in_memory().unwrap();
        store.set("P1", 7, 30.0).unwrap();

        let Increment::Added(record) = store.increment("P1", 5, 99.0).unwrap() else {
            panic!("increment refused");
        };
        assert_eq!(record.quantity, 12);
        // Existing price is kept
        assert_eq!(record.price, 30.0);
    }

    #[test]
    fn test_increment_creates_missing_record() {
        let store = SqliteInventory::in_memory().unwrap();
        let Increment::Added(record) = store.increment("P9", 3, 4.5).unwrap() else {
            panic!("increment refused");
        };
        assert_eq!(record.quantity, 3);
        assert_eq!(record.price, 4.5);
    }

    #[test]
    fn test_increment_past_counter_limit_is_refused() {
        let store = SqliteInventory::in_memory().unwrap();
        assert!(matches!(
            store.increment("P1", 4_000_000_000, 1.0).unwrap(),
            Increment::Added(_)
        ));

        assert_eq!(
            store.increment("P1", 4_000_000_000, 1.0).unwrap(),
            Increment::Overflow
        );
        let record = store.get("P1").unwrap().unwrap();
        assert_eq!(record.quantity, 4_000_000_000);
        assert_eq!(store.decrement_one("P1").unwrap(), Decrement::Remaining(3_999_999_999));

        // Filling up to the limit exactly is still allowed
        let room = u32::MAX - 3_999_999_999;
        assert_eq!(
            store.increment("P1", room, 1.0).unwrap(),
            Increment::Added(StockRecord {
                product_id: "P1".to_string(),
                quantity: u32::MAX,
                price: 1.0,
            })
        );
    }

    #[test]
    fn test_decrement_takes_one_unit() {
        let store = SqliteInventory::in_memory().unwrap();
        store.set("P1", 2, 1.0).unwrap();

        assert_eq!(store.decrement_one("P1").unwrap(), Decrement::Remaining(1));
        assert_eq!(store.decrement_one("P1").unwrap(), Decrement::Remaining(0));
        assert_eq!(store.decrement_one("P1").unwrap(), Decrement::SoldOut);
        assert_eq!(store.get("P1").unwrap().unwrap().quantity, 0);
    }

    #[test]
    fn test_decrement_missing_record_is_sold_out() {
        let store = SqliteInventory::in_memory().unwrap();
        assert_eq!(store.decrement_one("nope").unwrap(), Decrement::SoldOut);
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_seed_keeps_existing_records() {
        let store = SqliteInventory::in_memory().unwrap();
        store.set("P1", 4, 2.0).unwrap();

        assert!(!store.seed("P1", 9.0).unwrap());
        assert!(store.seed("P2", 9.0).unwrap());
        assert_eq!(store.get("P1").unwrap().unwrap().quantity, 4);
        assert_eq!(store.get("P2").unwrap().unwrap().quantity, 0);
    }

    #[test]
    fn test_concurrent_purchases_never_go_negative() {
        let store = Arc::new(SqliteInventory::in_memory().unwrap());
        store.set("P1", 20, 1.0).unwrap();

        let sold: u32 = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let store = Arc::clone(&store);
                    scope.spawn(move || {
                        (0..5)
                            .filter(|_| {
                                matches!(store.decrement_one("P1").unwrap(), Decrement::Remaining(_))
                            })
                            .count() as u32
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(sold, 20);
        assert_eq!(store.get("P1").unwrap().unwrap().quantity, 0);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("data").join("stock.db");

        let store = SqliteInventory::open(&db_path).unwrap();
        store.set("P1", 1, 1.0).unwrap();
        drop(store);

        let reopened = SqliteInventory::open(&db_path).unwrap();
        assert_eq!(reopened.get("P1").unwrap().unwrap().quantity, 1);
    }
}
