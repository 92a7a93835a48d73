//! Event reconciliation
//!
//! Every input the store reacts to, whether a fetch completion, a real-time
//! message or a local user action, is a [`SyncEvent`]. [`ChatStore::apply`]
//! routes it to the registry and/or the ledger and keeps them consistent:
//!
//! - the ledger only ever holds messages of the confirmed chat
//! - switching the confirmed chat clears the ledger
//! - `total_messages` only grows by one per accepted live message
//! - message pages for a chat that is no longer open are dropped

use crate::store::{Chat, ChatId, ChatStore, LocalChat, Message};
use serde::{Deserialize, Serialize};

/// Which fetch a loading flag belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchTarget {
    /// The chat list
    Chats,
    /// History of one chat
    Messages {
        /// Chat the fetch was issued for
        chat_id: ChatId,
    },
}

/// Input delivered to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// Real-time message from the transport
    MessageReceived {
        /// The message
        message: Message,
    },
    /// The local user sent a message
    MessageSent {
        /// The message
        message: Message,
    },
    /// The user opened a chat; the server has not confirmed it yet
    ChatOpened {
        /// Pointer to the chat
        local: LocalChat,
    },
    /// The server confirmed (fetched or created) the open chat
    ChatConfirmed {
        /// Full chat record
        chat: Chat,
    },
    /// The user closed the open chat
    ChatClosed,
    /// The open chat became active in the list context
    ChatActivated,
    /// The user started a brand-new conversation
    ChatStarted {
        /// The new chat
        chat: Chat,
    },
    /// The chat list is being fetched again from the first page
    ChatsRefreshed,
    /// A chat page fetch was issued
    ChatsRequested,
    /// A page of chats arrived
    ChatsPage {
        /// Chats in the page
        chats: Vec<Chat>,
        /// Server-reported chat count
        #[serde(default)]
        total: Option<u64>,
    },
    /// A history fetch was issued for `chat_id`
    MessagesRequested {
        /// Chat the fetch is for
        chat_id: ChatId,
    },
    /// A page of history arrived for `chat_id`
    MessagesPage {
        /// Chat the fetch was issued for
        chat_id: ChatId,
        /// Messages in the page, newest first
        messages: Vec<Message>,
        /// Server-reported message count
        #[serde(default)]
        total: Option<u64>,
    },
    /// A fetch failed; the collaborator already handled the error
    FetchFailed {
        /// Fetch that failed
        target: FetchTarget,
    },
}

impl SyncEvent {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessageReceived { .. } => "message_received",
            Self::MessageSent { .. } => "message_sent",
            Self::ChatOpened { .. } => "chat_opened",
            Self::ChatConfirmed { .. } => "chat_confirmed",
            Self::ChatClosed => "chat_closed",
            Self::ChatActivated => "chat_activated",
            Self::ChatStarted { .. } => "chat_started",
            Self::ChatsRefreshed => "chats_refreshed",
            Self::ChatsRequested => "chats_requested",
            Self::ChatsPage { .. } => "chats_page",
            Self::MessagesRequested { .. } => "messages_requested",
            Self::MessagesPage { .. } => "messages_page",
            Self::FetchFailed { .. } => "fetch_failed",
        }
    }
}

/// Why an event left the state unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Message for a chat that is not the confirmed one
    InactiveRoom,
    /// Message id already in the ledger
    DuplicateMessage,
    /// Page or fetch for a chat that is no longer open
    StalePage,
    /// Referenced chat is not in the registry
    UnknownChat,
}

/// Result of applying an event. Ignored events are policy, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    /// State changed
    Applied,
    /// State unchanged
    Ignored(IgnoreReason),
}

impl Outcome {
    /// Check if the event changed state
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

impl ChatStore {
    /// Apply one event
    pub fn apply(&mut self, event: SyncEvent) -> Outcome {
        let name = event.name();
        let outcome = match event {
            SyncEvent::MessageReceived { message } => self.on_message_received(message),
            SyncEvent::MessageSent { message } => self.on_message_sent(message),
            SyncEvent::ChatOpened { local } => {
                self.set_local_current_chat(Some(local));
                Outcome::Applied
            }
            SyncEvent::ChatConfirmed { chat } => self.on_chat_confirmed(chat),
            SyncEvent::ChatClosed => {
                self.close_current_chat();
                self.reset_messages();
                // Late pages for the closed chat are discarded.
                self.set_loading_get_messages(false);
                Outcome::Applied
            }
            SyncEvent::ChatActivated => {
                if self.promote_current_chat_to_first() {
                    Outcome::Applied
                } else {
                    Outcome::Ignored(IgnoreReason::UnknownChat)
                }
            }
            SyncEvent::ChatStarted { chat } => {
                self.add_new_chat(chat);
                Outcome::Applied
            }
            SyncEvent::ChatsRefreshed => {
                self.reset_chats();
                self.set_total_chats(None);
                Outcome::Applied
            }
            SyncEvent::ChatsRequested => {
                self.registry.set_loading(true);
                Outcome::Applied
            }
            SyncEvent::ChatsPage { chats, total } => {
                let added = self.append_chats(chats);
                self.set_total_chats(total);
                self.registry.set_loading(false);
                tracing::debug!(added, ?total, "Ingested chat page");
                Outcome::Applied
            }
            SyncEvent::MessagesRequested { chat_id } => {
                if !self.accepts_page_for(&chat_id) {
                    Outcome::Ignored(IgnoreReason::StalePage)
                } else {
                    self.set_loading_get_messages(true);
                    Outcome::Applied
                }
            }
            SyncEvent::MessagesPage {
                chat_id,
                messages,
                total,
            } => self.on_messages_page(chat_id, messages, total),
            SyncEvent::FetchFailed { target } => self.on_fetch_failed(target),
        };

        match outcome {
            Outcome::Applied => tracing::debug!(event = name, "Applied event"),
            Outcome::Ignored(reason) => {
                tracing::debug!(event = name, ?reason, "Ignored event")
            }
        }
        outcome
    }

    /// Apply events in delivery order
    pub fn apply_all(&mut self, events: impl IntoIterator<Item = SyncEvent>) -> Vec<Outcome> {
        events.into_iter().map(|event| self.apply(event)).collect()
    }

    fn on_message_received(&mut self, message: Message) -> Outcome {
        if self.settings.touch_chat_on_inbound {
            self.registry.touch(&message.room, message.created_at);
            if !self.active.is_confirmed(&message.room) {
                self.registry.increment_unread(&message.room);
            }
        }
        self.accept_live_message(message)
    }

    fn on_message_sent(&mut self, message: Message) -> Outcome {
        let room = message.room.clone();
        let created_at = message.created_at;
        let outcome = self.accept_live_message(message);
        if outcome.is_applied() {
            self.registry.touch(&room, created_at);
            self.promote_current_chat_to_first();
        }
        outcome
    }

    /// Prepend a live message if it belongs to the confirmed chat
    fn accept_live_message(&mut self, message: Message) -> Outcome {
        if !self.active.is_confirmed(&message.room) {
            tracing::trace!(room = %message.room, id = %message.id, "Message for inactive chat");
            return Outcome::Ignored(IgnoreReason::InactiveRoom);
        }
        if !self.prepend_message(message) {
            return Outcome::Ignored(IgnoreReason::DuplicateMessage);
        }
        self.ledger.increment_total();
        Outcome::Applied
    }

    fn on_chat_confirmed(&mut self, chat: Chat) -> Outcome {
        let id = chat.id.clone();
        if self.registry.contains(&id) {
            self.append_chats(vec![chat]);
        } else {
            self.add_new_chat(chat);
        }
        self.registry.mark_read(&id);

        let previous = self.confirm_chat(id.clone());
        // A history fetch for the new chat follows; start from nothing.
        self.reset_messages();
        self.set_loading_get_messages(false);
        tracing::debug!(chat = %id, ?previous, "Confirmed active chat");
        Outcome::Applied
    }

    fn on_messages_page(
        &mut self,
        chat_id: ChatId,
        messages: Vec<Message>,
        total: Option<u64>,
    ) -> Outcome {
        if !self.accepts_page_for(&chat_id) {
            tracing::warn!(
                chat = %chat_id,
                current = ?self.current_chat_id(),
                "Dropping message page for a chat that is no longer open"
            );
            return Outcome::Ignored(IgnoreReason::StalePage);
        }
        let (messages, foreign): (Vec<_>, Vec<_>) = messages
            .into_iter()
            .partition(|message| message.room == chat_id);
        if !foreign.is_empty() {
            tracing::warn!(
                chat = %chat_id,
                skipped = foreign.len(),
                "Skipping messages that belong to another chat"
            );
        }
        let added = self.append_messages(messages);
        self.set_total_messages(total);
        self.set_loading_get_messages(false);
        tracing::debug!(chat = %chat_id, added, ?total, "Ingested message page");
        Outcome::Applied
    }

    fn on_fetch_failed(&mut self, target: FetchTarget) -> Outcome {
        match target {
            FetchTarget::Chats => {
                self.registry.set_loading(false);
                Outcome::Applied
            }
            FetchTarget::Messages { chat_id } => {
                if !self.accepts_page_for(&chat_id) {
                    return Outcome::Ignored(IgnoreReason::StalePage);
                }
                self.set_loading_get_messages(false);
                Outcome::Applied
            }
        }
    }

    fn accepts_page_for(&self, chat_id: &ChatId) -> bool {
        !self.settings.discard_stale_pages || self.active.is_confirmed(chat_id)
    }
}
