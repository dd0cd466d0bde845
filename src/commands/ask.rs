//! Ask command handler
//!
//! Sends a single text follow-up through the gateway and prints the
//! answer.

use crate::commands::build_assistant;
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;

/// Run the ask command
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `query` - The question to ask
/// * `speak` - Speak the answer aloud
pub async fn run_ask(config: Config, query: String, speak: bool) -> Result<()> {
    let assistant = build_assistant(&config, None, speak)?;

    let answer = assistant.ask(&query, speak).await?;
    println!("{}", answer.green());
    Ok(())
}
