//! Owned read views for UI collaborators
//!
//! Snapshots are copies: holding one never blocks or aliases the store.

use crate::store::{ActiveChat, Chat, ChatStore, Message};
use serde::{Deserialize, Serialize};

/// Chat list as the sidebar shows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatListSnapshot {
    /// Chats, most recently updated first
    pub chats: Vec<Chat>,
    /// Server-reported chat count
    pub total: Option<u64>,
    /// Whether a chat page fetch is in flight
    pub loading: bool,
    /// Sum of unread counters
    pub unread_total: u64,
    /// Number of pending chat requests
    pub request_count: usize,
}

/// Transcript of the open chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageListSnapshot {
    /// Messages, oldest first
    pub messages: Vec<Message>,
    /// Server-reported message count
    pub total: Option<u64>,
    /// Whether a history fetch is in flight
    pub loading: bool,
    /// Whether older history remains
    pub has_more: bool,
}

/// Everything a UI needs to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Change counter at the time of the snapshot
    pub version: u64,
    /// Open chat state
    pub active: ActiveChat,
    /// Confirmed open chat, if it is in the registry
    pub current_chat: Option<Chat>,
    /// Chat list
    pub chat_list: ChatListSnapshot,
    /// Transcript
    pub message_list: MessageListSnapshot,
}

impl ChatStore {
    /// Copy of the chat list view
    pub fn chat_list_snapshot(&self) -> ChatListSnapshot {
        let registry = self.registry();
        ChatListSnapshot {
            chats: registry.ordered().into_iter().cloned().collect(),
            total: registry.total_chats(),
            loading: registry.is_loading(),
            unread_total: registry.unread_total(),
            request_count: registry.request_count(),
        }
    }

    /// Copy of the transcript view
    pub fn message_list_snapshot(&self) -> MessageListSnapshot {
        let ledger = self.ledger();
        MessageListSnapshot {
            messages: ledger.ordered().into_iter().cloned().collect(),
            total: ledger.total_messages(),
            loading: ledger.is_loading(),
            has_more: ledger.has_more(),
        }
    }

    /// Copy of the whole store
    pub fn snapshot(&self) -> StoreSnapshot {
        tracing::trace!(version = self.version(), "Taking snapshot");
        StoreSnapshot {
            version: self.version(),
            active: self.active().clone(),
            current_chat: self.current_chat().cloned(),
            chat_list: self.chat_list_snapshot(),
            message_list: self.message_list_snapshot(),
        }
    }
}
