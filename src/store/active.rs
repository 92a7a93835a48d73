//! Active chat tracking
//!
//! The user can open a chat before the server has confirmed it, so the
//! tracker distinguishes a provisional local pointer from a confirmed chat id.
//! It never owns chat data; confirmed ids point into the registry.

use crate::store::chat::{ChatId, LocalChat};
use serde::{Deserialize, Serialize};

/// Which chat is open
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActiveChat {
    /// No chat open
    #[default]
    None,
    /// Opened locally, waiting for the server
    LocalOnly {
        /// Pointer set when the user opened the chat
        local: LocalChat,
    },
    /// Confirmed by the server
    Confirmed {
        /// Registry id of the open chat
        chat_id: ChatId,
        /// Local pointer that led to the confirmation, if any
        local: Option<LocalChat>,
    },
}

impl ActiveChat {
    /// Open a chat locally.
    ///
    /// A pointer to the already confirmed chat is attached to the
    /// confirmation; any other chat replaces whatever was open.
    pub fn open_local(&mut self, local: LocalChat) {
        if let Self::Confirmed {
            chat_id,
            local: current,
        } = self
        {
            if local.chat_id.as_ref() == Some(&*chat_id) {
                *current = Some(local);
                return;
            }
        }
        *self = Self::LocalOnly { local };
    }

    /// Drop the local pointer. A confirmed chat stays open.
    pub fn clear_local(&mut self) {
        match self {
            Self::Confirmed { local, .. } => *local = None,
            _ => *self = Self::None,
        }
    }

    /// Confirm `chat_id` as the open chat and return the previously
    /// confirmed id. A pending local pointer is kept alongside it.
    pub fn confirm(&mut self, chat_id: ChatId) -> Option<ChatId> {
        let previous = std::mem::take(self);
        let (previous_id, local) = match previous {
            Self::None => (None, None),
            Self::LocalOnly { local } => (None, Some(local)),
            Self::Confirmed { chat_id, local } => (Some(chat_id), local),
        };
        *self = Self::Confirmed { chat_id, local };
        previous_id
    }

    /// Close the open chat
    pub fn clear(&mut self) {
        *self = Self::None;
    }

    /// Id of the confirmed chat, if any
    pub fn confirmed_id(&self) -> Option<&ChatId> {
        match self {
            Self::Confirmed { chat_id, .. } => Some(chat_id),
            _ => None,
        }
    }

    /// Local pointer, if the user opened a chat through the UI
    pub fn local(&self) -> Option<&LocalChat> {
        match self {
            Self::None => None,
            Self::LocalOnly { local } => Some(local),
            Self::Confirmed { local, .. } => local.as_ref(),
        }
    }

    /// Check if `id` is the confirmed chat
    pub fn is_confirmed(&self, id: &ChatId) -> bool {
        self.confirmed_id() == Some(id)
    }

    /// Check if any chat is open, confirmed or not
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }
}
