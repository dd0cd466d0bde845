//! History command handler
//!
//! Shows or clears the persisted session without creating a provider.

use crate::config::Config;
use crate::error::Result;
use crate::session::SessionStore;
use colored::Colorize;
use std::sync::Arc;

/// Run the history command
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `clear` - Clear the session instead of showing it
pub fn run_history(config: &Config, clear: bool) -> Result<()> {
    let store = Arc::new(match &config.session.file {
        Some(path) => SessionStore::new_with_path(path.clone())?,
        None => SessionStore::new()?,
    });

    if clear {
        store.clear()?;
        println!("{}", "Session cleared.".yellow());
        return Ok(());
    }

    let history = store.history();
    if history.is_empty() {
        println!("{}", "No session history.".dimmed());
        return Ok(());
    }

    for message in &history {
        let role = match message.role {
            crate::session::Role::User => "user".cyan(),
            crate::session::Role::Assistant => "assistant".green(),
        };
        let marker = if message.image_data.is_some() {
            " [image]".dimmed().to_string()
        } else {
            String::new()
        };
        println!("{}{}: {}", role, marker, message.content);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ChatMessage;

    fn test_config(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.session.file = Some(
            dir.path()
                .join("session.json")
                .to_string_lossy()
                .to_string(),
        );
        config
    }

    #[test]
    fn test_history_show_on_empty_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(run_history(&test_config(&dir), false).is_ok());
    }

    #[test]
    fn test_history_clear_removes_messages() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(&dir);

        let store =
            SessionStore::new_with_path(dir.path().join("session.json")).expect("create store");
        store.append(ChatMessage::user("hello")).expect("append");
        drop(store);

        run_history(&config, true).expect("clear");

        let reopened =
            SessionStore::new_with_path(dir.path().join("session.json")).expect("reopen");
        assert!(reopened.history().is_empty());
    }
}
