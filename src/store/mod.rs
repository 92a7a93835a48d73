//! Chat and message state
//!
//! The module is organized into submodules:
//! - `chat` - Chat records, ids and the local "open chat" pointer
//! - `message` - Message records
//! - `registry` - Known chats and their recency order
//! - `ledger` - Messages of the active chat and history pagination
//! - `active` - Local versus confirmed active chat
//! - `chat_store` - The state container combining all of the above
//! - `settings` - Store configuration
//! - `shared` - Thread-safe handle around the store

// Submodules
pub mod active;
pub mod chat;
pub mod chat_store;
pub mod ledger;
pub mod message;
pub mod registry;
pub mod settings;
pub mod shared;

// Re-export commonly used types
pub use active::ActiveChat;
pub use chat::{Chat, ChatId, LocalChat, Participant};
pub use chat_store::{ChatStore, PageRequest};
pub use ledger::MessageLedger;
pub use message::{Message, MessageId};
pub use registry::ChatRegistry;
pub use settings::Settings;
pub use shared::SharedChatStore;
