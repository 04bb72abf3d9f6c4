//! Stock command handler.
//!
//! Inspects and edits the inventory store directly.

use crate::bootstrap::open_inventory;
use clap::{Args, Subcommand};
use hurtbot_core::{config::AppConfig, AppResult};
use hurtbot_knowledge::{Catalog, InventoryStore};

/// Inventory store management
#[derive(Args, Debug)]
pub struct StockCommand {
    #[command(subcommand)]
    pub action: StockAction,
}

#[derive(Subcommand, Debug)]
pub enum StockAction {
    /// Show the stock record of a product
    Show(StockShowCommand),
    /// Set quantity (and optionally price) of a product
    Set(StockSetCommand),
    /// Create zero-quantity records for every catalog product
    Seed,
}

impl StockCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let inventory = open_inventory(config)?;

        match &self.action {
            StockAction::Show(cmd) => cmd.execute(&inventory),
            StockAction::Set(cmd) => cmd.execute(config, &inventory),
            StockAction::Seed => seed(config, &inventory),
        }
    }
}

/// Show stock of one product
#[derive(Args, Debug)]
pub struct StockShowCommand {
    /// Product identifier
    pub product_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StockShowCommand {
    pub fn execute(&self, inventory: &dyn InventoryStore) -> AppResult<()> {
        tracing::info!("Executing stock show for '{}'", self.product_id);

        let record = inventory.get(&self.product_id)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&record)?);
            return Ok(());
        }

        match record {
            Some(record) => println!(
                "{}: {} szt. @ {:.2} zł",
                record.product_id, record.quantity, record.price
            ),
            None => println!("{}: no stock record", self.product_id),
        }

        Ok(())
    }
}

/// Set stock of one product
#[derive(Args, Debug)]
pub struct StockSetCommand {
    /// Product identifier
    pub product_id: String,

    /// New quantity
    pub quantity: u32,

    /// Unit price (defaults to the current price, then the catalog price)
    #[arg(long)]
    pub price: Option<f64>,
}

impl StockSetCommand {
    pub fn execute(&self, config: &AppConfig, inventory: &dyn InventoryStore) -> AppResult<()> {
        tracing::info!("Executing stock set for '{}'", self.product_id);

        let price = match self.price {
            Some(price) => price,
            None => match inventory.get(&self.product_id)? {
                Some(record) => record.price,
                None => Catalog::load(&config.catalog_path)?
                    .get(&self.product_id)
                    .and_then(|p| p.price)
                    .unwrap_or(0.0),
            },
        };

        let record = inventory.set(&self.product_id, self.quantity, price)?;
        println!(
            "{}: {} szt. @ {:.2} zł",
            record.product_id, record.quantity, record.price
        );
        Ok(())
    }
}

fn seed(config: &AppConfig, inventory: &dyn InventoryStore) -> AppResult<()> {
    tracing::info!("Executing stock seed");

    let catalog = Catalog::load(&config.catalog_path)?;
    let mut created = 0;
    for product in catalog.products() {
        if inventory.seed(&product.id, product.price.unwrap_or(0.0))? {
            created += 1;
        }
    }

    println!(
        "Seeded {} new stock records ({} catalog products)",
        created,
        catalog.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hurtbot_knowledge::SqliteInventory;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_with_catalog(file: &NamedTempFile) -> AppConfig {
        AppConfig {
            catalog_path: file.path().to_path_buf(),
            ..AppConfig::default()
        }
    }

    fn catalog_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"products": [
                {{"id": "P1", "name": "Cement", "category": "Cementy", "price": 32.5}},
                {{"id": "P2", "name": "Farba", "category": "Farby"}}
            ]}}"#
        )
        .unwrap();
        file
    }

    #[test]
    fn test_seed_creates_missing_records() {
        let file = catalog_file();
        let config = config_with_catalog(&file);
        let inventory = SqliteInventory::in_memory().unwrap();
        inventory.set("P1", 9, 30.0).unwrap();

        seed(&config, &inventory).unwrap();

        assert_eq!(inventory.get("P1").unwrap().unwrap().quantity, 9);
        let farba = inventory.get("P2").unwrap().unwrap();
        assert_eq!(farba.quantity, 0);
        assert_eq!(farba.price, 0.0);
    }

    #[test]
    fn test_set_uses_catalog_price_for_new_record() {
        let file = catalog_file();
        let config = config_with_catalog(&file);
        let inventory = SqliteInventory::in_memory().unwrap();

        let cmd = StockSetCommand {
            product_id: "P1".to_string(),
            quantity: 4,
            price: None,
        };
        cmd.execute(&config, &inventory).unwrap();

        let record = inventory.get("P1").unwrap().unwrap();
        assert_eq!(record.quantity, 4);
        assert_eq!(record.price, 32.5);
    }

    #[test]
    fn test_set_keeps_current_price() {
        let file = catalog_file();
        let config = config_with_catalog(&file);
        let inventory = SqliteInventory::in_memory().unwrap();
        inventory.set("P1", 1, 29.99).unwrap();

        let cmd = StockSetCommand {
            product_id: "P1".to_string(),
            quantity: 10,
            price: None,
        };
        cmd.execute(&config, &inventory).unwrap();

        assert_eq!(inventory.get("P1").unwrap().unwrap().price, 29.99);
    }
}
