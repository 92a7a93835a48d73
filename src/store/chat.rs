//! Chat records and the provisional "open chat" pointer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned chat identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    /// Wrap a raw identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChatId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ChatId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The other side of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// User identifier
    pub id: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Avatar URL, if the user has one
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Participant {
    /// Create a participant without an avatar
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            avatar: None,
        }
    }

    /// "First Last", as shown in the chat list and matched by search
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A conversation known to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique chat identifier
    pub id: ChatId,
    /// Who the conversation is with
    pub recipient: Participant,
    /// Time of the latest activity; drives list ordering
    pub updated_at: DateTime<Utc>,
    /// Messages received while the chat was not open
    #[serde(default)]
    pub unread_count: u32,
    /// Whether the chat is a pending request that was not accepted yet
    #[serde(default)]
    pub is_request: bool,
}

impl Chat {
    /// Create a chat with no unread messages
    pub fn new(id: impl Into<ChatId>, recipient: Participant, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            recipient,
            updated_at,
            unread_count: 0,
            is_request: false,
        }
    }

    /// Raise `updated_at` to `at`. Older timestamps are ignored so that
    /// late deliveries never move a chat backwards in the list.
    pub fn touch(&mut self, at: DateTime<Utc>) -> bool {
        if at > self.updated_at {
            self.updated_at = at;
            true
        } else {
            false
        }
    }

    /// Mark all messages as read
    pub fn mark_read(&mut self) {
        self.unread_count = 0;
    }

    /// Count one more unread message
    pub fn mark_unread(&mut self) {
        self.unread_count = self.unread_count.saturating_add(1);
    }

    /// Check if this chat has unread messages
    pub fn has_unread(&self) -> bool {
        self.unread_count > 0
    }
}

/// Lightweight pointer to the chat the user just opened.
///
/// Exists before the server has confirmed (or created) the chat, so the id
/// is optional: a brand-new conversation has none until its first message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalChat {
    /// Chat id, when the conversation already exists server-side
    #[serde(default)]
    pub chat_id: Option<ChatId>,
    /// Who the conversation is with
    pub recipient: Participant,
}

impl LocalChat {
    /// Pointer to a chat the server does not know about yet
    pub fn provisional(recipient: Participant) -> Self {
        Self {
            chat_id: None,
            recipient,
        }
    }

    /// Pointer to an existing chat
    pub fn existing(chat: &Chat) -> Self {
        Self {
            chat_id: Some(chat.id.clone()),
            recipient: chat.recipient.clone(),
        }
    }
}
