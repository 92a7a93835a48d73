//! The state container owned by the application's composition root

use crate::store::{
    active::ActiveChat,
    chat::{Chat, ChatId, LocalChat},
    ledger::MessageLedger,
    message::Message,
    registry::ChatRegistry,
    settings::Settings,
};
use serde::{Deserialize, Serialize};

/// Offset/limit request for the fetch layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Chat whose history is requested; `None` for the chat list
    pub chat_id: Option<ChatId>,
    /// Number of items already loaded
    pub offset: u64,
    /// Page size
    pub limit: u32,
}

/// Chats, the active chat and its messages.
///
/// All mutation goes through `&mut self`, so handlers never overlap. Use
/// [`crate::store::SharedChatStore`] when several tasks need access.
#[derive(Debug, Clone, Default)]
pub struct ChatStore {
    pub(crate) registry: ChatRegistry,
    pub(crate) ledger: MessageLedger,
    pub(crate) active: ActiveChat,
    pub(crate) settings: Settings,
    version: u64,
}

impl ChatStore {
    /// Create an empty store with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given settings
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Active settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings. Stored state is kept.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.bump();
    }

    // ========== Chat registry ==========

    /// Append a fetched page of chats
    pub fn append_chats(&mut self, batch: Vec<Chat>) -> usize {
        self.registry.append_chats(batch)
    }

    /// Insert a newly started chat at the front
    pub fn add_new_chat(&mut self, chat: Chat) -> bool {
        self.registry.add_new_chat(chat)
    }

    /// Move the confirmed chat to the front of raw order.
    /// No-op when nothing is confirmed or the chat is not in the registry.
    pub fn promote_current_chat_to_first(&mut self) -> bool {
        match self.active.confirmed_id() {
            Some(id) => {
                let id = id.clone();
                self.registry.promote_to_first(&id)
            }
            None => false,
        }
    }

    /// Forget every chat
    pub fn reset_chats(&mut self) {
        self.registry.reset_chats();
    }

    /// Set the server-reported chat count
    pub fn set_total_chats(&mut self, total: Option<u64>) {
        self.registry.set_total_chats(total);
    }

    /// Chats, most recently updated first
    pub fn chats(&self) -> Vec<&Chat> {
        self.registry.ordered()
    }

    /// Chats whose recipient name matches `query`
    pub fn search_chats(&self, query: &str) -> Vec<&Chat> {
        self.registry.search(query)
    }

    /// Server-reported chat count, if fetched
    pub fn total_chats(&self) -> Option<u64> {
        self.registry.total_chats()
    }

    /// Read access to the registry
    pub fn registry(&self) -> &ChatRegistry {
        &self.registry
    }

    // ========== Message ledger ==========

    /// Append a page of older messages
    pub fn append_messages(&mut self, batch: Vec<Message>) -> usize {
        self.ledger.append_messages(batch)
    }

    /// Insert the newest message at the front
    pub fn prepend_message(&mut self, message: Message) -> bool {
        self.ledger.prepend_message(message)
    }

    /// Clear messages and forget the total
    pub fn reset_messages(&mut self) {
        self.ledger.reset_messages();
    }

    /// Set the server-reported message count
    pub fn set_total_messages(&mut self, total: Option<u64>) {
        self.ledger.set_total_messages(total);
    }

    /// Set whether a history fetch is in flight
    pub fn set_loading_get_messages(&mut self, loading: bool) {
        self.ledger.set_loading(loading);
    }

    /// Messages of the active chat, oldest first
    pub fn messages(&self) -> Vec<&Message> {
        self.ledger.ordered()
    }

    /// Server-reported message count, if fetched
    pub fn total_messages(&self) -> Option<u64> {
        self.ledger.total_messages()
    }

    /// Whether a history fetch is in flight
    pub fn loading_get_messages(&self) -> bool {
        self.ledger.is_loading()
    }

    /// Read access to the ledger
    pub fn ledger(&self) -> &MessageLedger {
        &self.ledger
    }

    // ========== Active chat ==========

    /// Confirm `chat` as the open chat. The chat must already be in the
    /// registry for [`Self::current_chat`] to resolve it.
    pub fn set_current_chat(&mut self, chat: &Chat) -> Option<ChatId> {
        self.confirm_chat(chat.id.clone())
    }

    pub(crate) fn confirm_chat(&mut self, chat_id: ChatId) -> Option<ChatId> {
        self.bump();
        self.active.confirm(chat_id)
    }

    /// Set or clear the local pointer. Clearing leaves a confirmed chat open.
    pub fn set_local_current_chat(&mut self, local: Option<LocalChat>) {
        match local {
            Some(local) => self.active.open_local(local),
            None => self.active.clear_local(),
        }
        self.bump();
    }

    /// Close the open chat, confirmed or not
    pub fn close_current_chat(&mut self) {
        self.active.clear();
        self.bump();
    }

    /// Confirmed open chat, resolved through the registry
    pub fn current_chat(&self) -> Option<&Chat> {
        self.active
            .confirmed_id()
            .and_then(|id| self.registry.get(id))
    }

    /// Id of the confirmed open chat
    pub fn current_chat_id(&self) -> Option<&ChatId> {
        self.active.confirmed_id()
    }

    /// Local pointer to the chat the user opened
    pub fn local_current_chat(&self) -> Option<&LocalChat> {
        self.active.local()
    }

    /// Active chat state
    pub fn active(&self) -> &ActiveChat {
        &self.active
    }

    // ========== Pagination ==========

    /// Next chat page to fetch, or `None` when all chats are loaded or a
    /// fetch is already running
    pub fn next_chats_page(&self) -> Option<PageRequest> {
        if self.registry.is_loading() || !self.registry.has_more() {
            return None;
        }
        Some(PageRequest {
            chat_id: None,
            offset: self.registry.len() as u64,
            limit: self.settings.chat_page_size,
        })
    }

    /// Next history page of the confirmed chat, or `None` when no chat is
    /// confirmed, all history is loaded, or a fetch is already running
    pub fn next_messages_page(&self) -> Option<PageRequest> {
        let chat_id = self.active.confirmed_id()?;
        if self.ledger.is_loading() || !self.ledger.has_more() {
            return None;
        }
        Some(PageRequest {
            chat_id: Some(chat_id.clone()),
            offset: self.ledger.len() as u64,
            limit: self.settings.message_page_size,
        })
    }

    /// Change counter over chats, messages, the active chat and settings
    pub fn version(&self) -> u64 {
        self.registry
            .version()
            .wrapping_add(self.ledger.version())
            .wrapping_add(self.version)
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}
