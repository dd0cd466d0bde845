//! Interactive session handler
//!
//! Runs a readline loop over the assistant: plain input is sent as a
//! text follow-up, slash commands drive the camera, speech and session.

use crate::assistant::Assistant;
use crate::commands::build_assistant;
use crate::config::Config;
use crate::error::{LenstutorError, Result};
use crate::gateway::PromptMode;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Slash commands recognized by the interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
enum SpecialCommand {
    /// `/solve [mode]` - capture a frame and solve it
    Solve(PromptMode),
    /// `/camera` - toggle between front and back camera
    ToggleCamera,
    /// `/speak on|off` - toggle spoken answers
    Speak(bool),
    /// `/stop` - cancel in-flight speech
    Stop,
    /// `/history` - show the session
    History,
    /// `/clear` - clear the session
    Clear,
    /// `/help` - show available commands
    Help,
    /// `/quit` or `/exit` - leave the session
    Quit,
    /// Anything else starting with `/`
    Unknown(String),
}

fn parse_special_command(input: &str) -> Option<SpecialCommand> {
    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let argument = parts.next();

    Some(match command {
        "/solve" => {
            let mode = argument
                .map(PromptMode::parse_str)
                .transpose()
                .ok()
                .flatten()
                .unwrap_or_default();
            SpecialCommand::Solve(mode)
        }
        "/camera" => SpecialCommand::ToggleCamera,
        "/speak" => SpecialCommand::Speak(argument != Some("off")),
        "/stop" => SpecialCommand::Stop,
        "/history" => SpecialCommand::History,
        "/clear" => SpecialCommand::Clear,
        "/help" => SpecialCommand::Help,
        "/quit" | "/exit" => SpecialCommand::Quit,
        other => SpecialCommand::Unknown(other.to_string()),
    })
}

fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  /solve [default|eli5|steps]  capture a frame and solve it");
    println!("  /camera                      toggle front/back camera");
    println!("  /speak on|off                toggle spoken answers");
    println!("  /stop                        cancel in-flight speech");
    println!("  /history                     show the session");
    println!("  /clear                       clear the session");
    println!("  /quit                        leave the session");
    println!("Anything else is sent as a text follow-up.");
}

fn print_answer(result: Result<String>) {
    match result {
        Ok(answer) => println!("{}", answer.green()),
        Err(e) => match e.downcast_ref::<LenstutorError>() {
            Some(LenstutorError::Busy) => {
                println!("{}", "Still working on the previous request.".yellow())
            }
            _ => println!("{} {:#}", "Error:".red(), e),
        },
    }
}

/// Start an interactive session
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `speak` - Initial spoken-answer setting (overrides config when set)
pub async fn run_chat(config: Config, speak: bool) -> Result<()> {
    let mut speak = speak || config.speech.enabled;
    let assistant = build_assistant(&config, None, speak)?;

    let mut rl = DefaultEditor::new()?;

    println!("{}", "Lenstutor interactive session".bold());
    println!("{}", "Type /help for commands, /quit to leave.".dimmed());

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match parse_special_command(trimmed) {
                    Some(SpecialCommand::Solve(mode)) => {
                        println!("{}", "Capturing frame...".dimmed());
                        print_answer(assistant.solve(mode, speak).await);
                    }
                    Some(SpecialCommand::ToggleCamera) => match assistant.toggle_camera() {
                        Ok(facing) => println!("Camera facing: {}", facing.to_string().cyan()),
                        Err(e) => println!("{} {:#}", "Error:".red(), e),
                    },
                    Some(SpecialCommand::Speak(enabled)) => {
                        if enabled && !assistant.has_speech() {
                            println!(
                                "{}",
                                "Speech is disabled in config; restart with --speak to enable it."
                                    .yellow()
                            );
                            continue;
                        }
                        speak = enabled;
                        if !enabled {
                            assistant.stop_speaking();
                        }
                        println!("Speech {}", if enabled { "on".cyan() } else { "off".cyan() });
                    }
                    Some(SpecialCommand::Stop) => assistant.stop_speaking(),
                    Some(SpecialCommand::History) => print_history(&assistant),
                    Some(SpecialCommand::Clear) => match assistant.clear_history() {
                        Ok(()) => println!("{}", "Session cleared.".yellow()),
                        Err(e) => println!("{} {:#}", "Error:".red(), e),
                    },
                    Some(SpecialCommand::Help) => print_help(),
                    Some(SpecialCommand::Quit) => break,
                    Some(SpecialCommand::Unknown(command)) => {
                        println!("Unknown command: {} (try /help)", command.red());
                    }
                    None => print_answer(assistant.ask(trimmed, speak).await),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::error!("Readline error: {}", e);
                break;
            }
        }
    }

    assistant.stop_speaking();
    println!("{}", "Goodbye!".dimmed());
    Ok(())
}

fn print_history(assistant: &Assistant) {
    let history = assistant.history();
    if history.is_empty() {
        println!("{}", "No session history.".dimmed());
        return;
    }
    for message in &history {
        println!("{}: {}", message.role.to_string().cyan(), message.content);
    }
}
