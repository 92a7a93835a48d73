//! Message records

use crate::store::chat::ChatId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Message identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap a raw identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier for a locally authored message
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message ID
    pub id: MessageId,
    /// Chat the message belongs to
    pub room: ChatId,
    /// Sender user ID
    pub sender: String,
    /// Text content
    pub content: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message
    pub fn new(
        id: impl Into<MessageId>,
        room: impl Into<ChatId>,
        sender: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            room: room.into(),
            sender: sender.into(),
            content: content.into(),
            created_at,
        }
    }

    /// Build a message authored by the local user, stamped now
    pub fn outgoing(room: ChatId, sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            room,
            sender: sender.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Check if `user_id` wrote this message
    pub fn is_from(&self, user_id: &str) -> bool {
        self.sender == user_id
    }
}
