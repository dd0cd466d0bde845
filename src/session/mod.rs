//! Session persistence for conversation history
//!
//! The session store keeps an ordered, size-bounded log of chat messages
//! in a single local JSON file so a conversation survives process
//! restarts. A missing or unparseable file always degrades to an empty
//! session, never an error.

use crate::error::{LenstutorError, Result};
use anyhow::Context;
use chrono::Utc;
use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::Mutex;

pub mod context;
pub mod types;

pub use context::{build_context, ContextTarget, DEFAULT_CONTEXT_TURNS};
pub use types::{ChatMessage, Role, SessionData, MAX_MESSAGES};

/// Observer callback invoked with a snapshot after every mutation
type Observer = Box<dyn Fn(&SessionData) + Send + Sync>;

/// File-backed store for the rolling conversation session
///
/// All operations are synchronous; the only shared mutable resource is
/// the session file, and callers serialize access by admitting one
/// inference request at a time. Observers registered via [`subscribe`]
/// are notified after every successful `append` or `clear`, replacing
/// the original design's fixed-interval polling.
///
/// [`subscribe`]: SessionStore::subscribe
pub struct SessionStore {
    path: PathBuf,
    observers: Mutex<Vec<Observer>>,
}

impl SessionStore {
    /// Create a store at the default per-user location
    ///
    /// The session file lives in the user's data directory. The path can
    /// be overridden with the `LENSTUTOR_SESSION_FILE` environment
    /// variable, which makes it easy to point the binary at a test file
    /// without changing the user's application data dir.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("LENSTUTOR_SESSION_FILE") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "lenstutor", "lenstutor")
            .ok_or_else(|| LenstutorError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| LenstutorError::Storage(e.to_string()))?;

        Ok(Self::from_path(data_dir.join("session.json")))
    }

    /// Create a store that uses the specified session file path
    ///
    /// This is primarily useful for tests where the default application
    /// data directory is not desirable (for example, a temp directory).
    ///
    /// # Examples
    ///
    /// ```
    /// use lenstutor::session::SessionStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SessionStore::new_with_path(dir.path().join("session.json")).unwrap();
    /// assert!(store.history().is_empty());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for session file")
                .map_err(|e| LenstutorError::Storage(e.to_string()))?;
        }

        Ok(Self::from_path(path))
    }

    fn from_path(path: PathBuf) -> Self {
        Self {
            path,
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Read the current session
    ///
    /// Returns a fresh empty session when no file exists or the persisted
    /// value is unparseable. Corrupt state degrades to empty state; this
    /// method never fails.
    pub fn read(&self) -> SessionData {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!(
                        "Session file {} is unparseable ({}); starting empty",
                        self.path.display(),
                        e
                    );
                    SessionData::empty()
                }
            },
            Err(_) => SessionData::empty(),
        }
    }

    /// Append a message to the session
    ///
    /// Loads the current session, appends the message, truncates to the
    /// most recent [`MAX_MESSAGES`] entries (oldest dropped first), stamps
    /// `last_active`, and persists. Observers are notified on success.
    ///
    /// # Examples
    ///
    /// ```
    /// use lenstutor::session::{ChatMessage, SessionStore};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SessionStore::new_with_path(dir.path().join("session.json")).unwrap();
    /// store.append(ChatMessage::user("hello")).unwrap();
    /// assert_eq!(store.history().len(), 1);
    /// ```
    pub fn append(&self, message: ChatMessage) -> Result<()> {
        let mut session = self.read();
        session.messages.push(message);

        if session.messages.len() > MAX_MESSAGES {
            let excess = session.messages.len() - MAX_MESSAGES;
            session.messages.drain(..excess);
        }
        session.last_active = Utc::now();

        self.persist(&session)?;
        self.notify(&session);
        Ok(())
    }

    /// Remove all persisted session state
    ///
    /// Subsequent reads return an empty session. Clearing an already
    /// empty store is not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(LenstutorError::Storage(format!(
                    "Failed to remove session file: {}",
                    e
                ))
                .into())
            }
        }
        self.notify(&SessionData::empty());
        Ok(())
    }

    /// Convenience read returning just the messages, oldest first
    pub fn history(&self) -> Vec<ChatMessage> {
        self.read().messages
    }

    /// Register an observer notified after every successful mutation
    ///
    /// The observer receives a snapshot of the session as it was
    /// persisted. Observers cannot be unregistered; they live as long as
    /// the store.
    pub fn subscribe(&self, observer: impl Fn(&SessionData) + Send + Sync + 'static) {
        if let Ok(mut observers) = self.observers.lock() {
            observers.push(Box::new(observer));
        }
    }

    fn persist(&self, session: &SessionData) -> Result<()> {
        let raw = serde_json::to_string(session)
            .context("Failed to serialize session")
            .map_err(|e| LenstutorError::Storage(e.to_string()))?;
        std::fs::write(&self.path, raw)
            .context("Failed to write session file")
            .map_err(|e| LenstutorError::Storage(e.to_string()))?;
        Ok(())
    }

    fn notify(&self, session: &SessionData) {
        if let Ok(observers) = self.observers.lock() {
            for observer in observers.iter() {
                observer(session);
            }
        }
    }
}
