//! Message ledger for the active chat

use crate::store::message::{Message, MessageId};
use std::collections::{HashSet, VecDeque};

/// Messages of the confirmed active chat.
///
/// Raw storage is newest-first: history pages are appended at the back
/// (they are older) and live messages are pushed at the front. The display
/// view reverses it, so the transcript reads oldest to newest.
#[derive(Debug, Clone, Default)]
pub struct MessageLedger {
    messages: VecDeque<Message>,
    ids: HashSet<MessageId>,
    total: Option<u64>,
    loading: bool,
    version: u64,
}

impl MessageLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page of older messages. Ids already present are skipped.
    /// Returns how many messages were stored.
    pub fn append_messages(&mut self, batch: impl IntoIterator<Item = Message>) -> usize {
        let mut added = 0;
        for message in batch {
            if self.ids.insert(message.id.clone()) {
                self.messages.push_back(message);
                added += 1;
            } else {
                tracing::trace!(id = %message.id, "Skipping duplicate message in page");
            }
        }
        self.bump();
        added
    }

    /// Insert the newest message at the front.
    /// Returns `false` if a message with the same id is already stored.
    pub fn prepend_message(&mut self, message: Message) -> bool {
        if !self.ids.insert(message.id.clone()) {
            return false;
        }
        self.messages.push_front(message);
        self.bump();
        true
    }

    /// Drop all messages and forget the total
    pub fn reset_messages(&mut self) {
        self.messages.clear();
        self.ids.clear();
        self.total = None;
        self.bump();
    }

    /// Set the server-reported message count (`None` = unknown)
    pub fn set_total_messages(&mut self, total: Option<u64>) {
        self.total = total;
        self.bump();
    }

    /// Count one more message, if the total is known
    pub fn increment_total(&mut self) {
        if let Some(total) = self.total.as_mut() {
            *total = total.saturating_add(1);
            self.bump();
        }
    }

    /// Server-reported message count, if fetched
    pub fn total_messages(&self) -> Option<u64> {
        self.total
    }

    /// Set whether a history fetch is in flight
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.bump();
    }

    /// Whether a history fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Messages oldest first, for display
    pub fn ordered(&self) -> Vec<&Message> {
        self.messages.iter().rev().collect()
    }

    /// Messages in raw storage order (newest first)
    pub fn raw(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Check if a message is stored
    pub fn contains(&self, id: &MessageId) -> bool {
        self.ids.contains(id)
    }

    /// Whether older history remains to be fetched
    pub fn has_more(&self) -> bool {
        self.total.is_none_or(|total| (self.len() as u64) < total)
    }

    /// Number of stored messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if no messages are stored
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Counter bumped by every mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}
