//! Command-line interface definition for Lenstutor
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for solving, follow-up queries, interactive
//! chat, and session history.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lenstutor - Camera-first AI teaching assistant
///
/// Point the camera at an academic problem, choose an explanation
/// style, and get a spoken or written answer with text follow-ups.
#[derive(Parser, Debug, Clone)]
#[command(name = "lenstutor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Session file override
    #[arg(long, env = "LENSTUTOR_SESSION_FILE")]
    pub session_file: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Lenstutor
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Capture a frame and solve the problem it shows
    Solve {
        /// Explanation mode: default, eli5, or steps
        #[arg(short, long, default_value = "default")]
        mode: String,

        /// Analyze an image file instead of the camera
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Speak the answer aloud
        #[arg(short, long)]
        speak: bool,
    },

    /// Ask a text follow-up about the current session
    Ask {
        /// The question to ask
        query: String,

        /// Speak the answer aloud
        #[arg(short, long)]
        speak: bool,
    },

    /// Start an interactive session
    Chat {
        /// Speak answers aloud
        #[arg(short, long)]
        speak: bool,
    },

    /// Show or clear the session history
    History {
        /// Clear the session instead of showing it
        #[arg(long)]
        clear: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            session_file: None,
            verbose: false,
            command: Commands::Chat { speak: false },
        }
    }
}
