//! Command handlers for the HurtBot CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod serve;
pub mod stock;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use serve::ServeCommand;
pub use stock::StockCommand;
