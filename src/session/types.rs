//! Session data types
//!
//! Defines the chat message and session structures persisted by the
//! session store. A session is a bounded, chronologically ordered log
//! of exchange turns between the user and the assistant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of messages retained in a session
///
/// Every append that would exceed this cap drops the oldest entries
/// first, preserving the most recent messages.
pub const MAX_MESSAGES: usize = 10;

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A message originating from the user (typed query or capture)
    User,
    /// A response produced by the inference provider
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One exchange turn in the session
///
/// `image_data` is present only on user turns that originated from a
/// camera capture. It is persisted for completeness but is never
/// replayed into the textual context of later requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who produced this message
    pub role: Role,
    /// Text payload (question text or answer text)
    pub content: String,
    /// Creation instant, non-decreasing across a session
    pub timestamp: DateTime<Utc>,
    /// Encoded image payload for capture-originated user turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl ChatMessage {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use lenstutor::session::{ChatMessage, Role};
    ///
    /// let msg = ChatMessage::user("What is 2+2?");
    /// assert_eq!(msg.role, Role::User);
    /// assert!(msg.image_data.is_none());
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            image_data: None,
        }
    }

    /// Creates a new assistant message
    ///
    /// # Examples
    ///
    /// ```
    /// use lenstutor::session::{ChatMessage, Role};
    ///
    /// let msg = ChatMessage::assistant("4");
    /// assert_eq!(msg.role, Role::Assistant);
    /// ```
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            image_data: None,
        }
    }

    /// Creates a user message that carries a captured image
    ///
    /// # Arguments
    ///
    /// * `content` - Placeholder text noting that an image was submitted
    /// * `image_data` - The encoded image data URL
    pub fn user_with_image(content: impl Into<String>, image_data: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            image_data: Some(image_data.into()),
        }
    }
}

/// The persisted session unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    /// Ordered message log, insertion order = chronological order
    pub messages: Vec<ChatMessage>,
    /// Timestamp of the most recent mutation
    pub last_active: DateTime<Utc>,
}

impl SessionData {
    /// Creates a fresh session with no messages
    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
            last_active: Utc::now(),
        }
    }
}

impl Default for SessionData {
    fn default() -> Self {
        Self::empty()
    }
}
