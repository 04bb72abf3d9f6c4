//! HurtBot CLI
//!
//! Main entry point for the hurtbot command-line tool.
//! Serves the wholesale assistant over HTTP, answers one-off questions and
//! manages the stock database.

mod bootstrap;
mod commands;
mod server;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ServeCommand, StockCommand};
use hurtbot_core::{
    config::AppConfig,
    logging::{self, LogFormat},
    AppResult,
};
use std::path::PathBuf;

/// HurtBot - B2B wholesale assistant for building materials
#[derive(Parser, Debug)]
#[command(name = "hurtbot")]
#[command(about = "B2B wholesale assistant for building materials", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "HURTBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the product catalog (JSON)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeCommand),

    /// Ask a single question
    Ask(AskCommand),

    /// Stock database management
    Stock(StockCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Defaults < config file < local.settings.json < environment < CLI
    let config = AppConfig::load(cli.config.as_deref())?.with_overrides(
        cli.catalog,
        cli.log_level,
        cli.log_json,
        cli.verbose,
        cli.no_color,
    );

    let format = if config.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    logging::init_logging(config.log_level.as_deref(), format, config.no_color)?;

    tracing::info!("HurtBot starting");
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!("Catalog: {:?}", config.catalog_path);
    tracing::debug!("Provider: {}", config.llm.provider);

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Ask(_) => "ask",
        Commands::Stock(_) => "stock",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Stock(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
