//! Solve command handler
//!
//! Captures one frame (or reads an image file), sends it through the
//! gateway with the selected explanation mode, and prints the answer.

use crate::commands::build_assistant;
use crate::config::Config;
use crate::error::{LenstutorError, Result};
use crate::gateway::PromptMode;
use colored::Colorize;
use std::path::PathBuf;

/// Run the solve command
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `mode` - Explanation mode name ("default", "eli5", or "steps")
/// * `image` - Optional image file to analyze instead of the camera
/// * `speak` - Speak the answer aloud
pub async fn run_solve(
    config: Config,
    mode: String,
    image: Option<PathBuf>,
    speak: bool,
) -> Result<()> {
    let mode = PromptMode::parse_str(&mode).map_err(LenstutorError::Config)?;
    let assistant = build_assistant(&config, image, speak)?;

    println!("{}", "Capturing frame...".dimmed());
    let answer = assistant.solve(mode, speak).await?;

    println!("{}", answer.green());
    Ok(())
}
