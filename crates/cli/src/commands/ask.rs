//! Ask command handler.
//!
//! Runs a single question through the answering pipeline and prints the answer.

use crate::bootstrap::build_assistant;
use clap::Args;
use hurtbot_core::{config::AppConfig, AppResult};

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let assistant = build_assistant(config)?;
        let answer = assistant.ask(&self.question).await;

        if self.json {
            let output = serde_json::json!({
                "answer": answer.text,
                "kind": answer.kind,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer.text);
        }

        Ok(())
    }
}
