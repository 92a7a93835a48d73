//! Chat registry: the set of known chats and their recency order

use crate::store::chat::{Chat, ChatId};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};

/// Known chats, keyed by id.
///
/// Raw order is kept separately from the records. It only matters as the
/// tie-break of the recency view returned by [`ChatRegistry::ordered`].
#[derive(Debug, Clone, Default)]
pub struct ChatRegistry {
    chats: HashMap<ChatId, Chat>,
    order: VecDeque<ChatId>,
    total: Option<u64>,
    loading: bool,
    version: u64,
}

impl ChatRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fetched page of chats.
    ///
    /// Chats already present are updated in place and keep their position.
    /// Returns how many chats were new.
    pub fn append_chats(&mut self, batch: impl IntoIterator<Item = Chat>) -> usize {
        let mut added = 0;
        for chat in batch {
            match self.chats.get_mut(&chat.id) {
                Some(existing) => *existing = chat,
                None => {
                    self.order.push_back(chat.id.clone());
                    self.chats.insert(chat.id.clone(), chat);
                    added += 1;
                }
            }
        }
        self.bump();
        added
    }

    /// Insert a chat at the front of raw order.
    ///
    /// A chat with the same id is replaced and moved to the front instead of
    /// being duplicated. Returns `true` if the chat was not known before.
    pub fn add_new_chat(&mut self, chat: Chat) -> bool {
        let id = chat.id.clone();
        let is_new = self.chats.insert(id.clone(), chat).is_none();
        if !is_new {
            self.order.retain(|known| known != &id);
        }
        self.order.push_front(id);
        self.bump();
        is_new
    }

    /// Move a chat to the front of raw order. Its `updated_at` is left alone,
    /// so a chat with a strictly newer timestamp still sorts above it.
    ///
    /// Returns `false` (and changes nothing) if the chat is unknown.
    pub fn promote_to_first(&mut self, id: &ChatId) -> bool {
        let Some(index) = self.order.iter().position(|known| known == id) else {
            return false;
        };
        if index > 0 {
            if let Some(id) = self.order.remove(index) {
                self.order.push_front(id);
            }
            self.bump();
        }
        true
    }

    /// Forget every chat. The total is left for the next page to overwrite.
    pub fn reset_chats(&mut self) {
        self.chats.clear();
        self.order.clear();
        self.bump();
    }

    /// Set the server-reported chat count (`None` = unknown)
    pub fn set_total_chats(&mut self, total: Option<u64>) {
        self.total = total;
        self.bump();
    }

    /// Server-reported chat count, if fetched
    pub fn total_chats(&self) -> Option<u64> {
        self.total
    }

    /// Set whether a chat page fetch is in flight
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.bump();
    }

    /// Whether a chat page fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Chats sorted by `updated_at`, newest first.
    ///
    /// Computed on every call. The sort is stable, so chats with equal
    /// timestamps keep their raw order.
    pub fn ordered(&self) -> Vec<&Chat> {
        let mut view: Vec<&Chat> = self.raw().collect();
        view.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        view
    }

    /// Chats in raw storage order
    pub fn raw(&self) -> impl Iterator<Item = &Chat> {
        self.order.iter().filter_map(|id| self.chats.get(id))
    }

    /// Recency-ordered chats whose recipient name contains `query`,
    /// ignoring case. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Chat> {
        let needle = query.trim().to_lowercase();
        self.ordered()
            .into_iter()
            .filter(|chat| chat.recipient.full_name().to_lowercase().contains(&needle))
            .collect()
    }

    /// Look up a chat
    pub fn get(&self, id: &ChatId) -> Option<&Chat> {
        self.chats.get(id)
    }

    /// Check if a chat is known
    pub fn contains(&self, id: &ChatId) -> bool {
        self.chats.contains_key(id)
    }

    /// Raise a chat's `updated_at`. Returns `true` if the timestamp moved.
    pub fn touch(&mut self, id: &ChatId, at: DateTime<Utc>) -> bool {
        let moved = self.chats.get_mut(id).is_some_and(|chat| chat.touch(at));
        if moved {
            self.bump();
        }
        moved
    }

    /// Clear a chat's unread counter
    pub fn mark_read(&mut self, id: &ChatId) -> bool {
        let Some(chat) = self.chats.get_mut(id) else {
            return false;
        };
        chat.mark_read();
        self.bump();
        true
    }

    /// Count one more unread message on a chat
    pub fn increment_unread(&mut self, id: &ChatId) -> bool {
        let Some(chat) = self.chats.get_mut(id) else {
            return false;
        };
        chat.mark_unread();
        self.bump();
        true
    }

    /// Sum of unread counters over all chats
    pub fn unread_total(&self) -> u64 {
        self.chats.values().map(|chat| u64::from(chat.unread_count)).sum()
    }

    /// Number of chats that are pending requests
    pub fn request_count(&self) -> usize {
        self.chats.values().filter(|chat| chat.is_request).count()
    }

    /// Whether the server has more chats than are loaded.
    /// An unknown total means nothing was fetched yet.
    pub fn has_more(&self) -> bool {
        self.total.is_none_or(|total| (self.len() as u64) < total)
    }

    /// Number of known chats
    pub fn len(&self) -> usize {
        self.chats.len()
    }

    /// Check if no chats are known
    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    /// Counter bumped by every mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}
