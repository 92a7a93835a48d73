//! Thread-safe store handle for concurrent producers

use crate::{
    reconciler::{Outcome, SyncEvent},
    snapshot::{ChatListSnapshot, MessageListSnapshot, StoreSnapshot},
    store::{chat_store::ChatStore, settings::Settings},
};

/// Clonable handle to a [`ChatStore`]
///
/// The fetch layer, the real-time transport and the UI can each hold a
/// clone. Every event is applied under the write lock, so handlers still run
/// one at a time, in the order the lock is acquired.
///
/// # Example
/// ```rust,no_run
/// use chatsync::store::SharedChatStore;
/// use chatsync::reconciler::SyncEvent;
///
/// # async fn example() {
/// let store = SharedChatStore::default();
///
/// let transport = store.clone();
/// tokio::spawn(async move {
///     transport.apply(SyncEvent::ChatsRequested).await;
/// });
///
/// let chats = store.chat_list().await;
/// println!("{} chats", chats.chats.len());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedChatStore {
    inner: std::sync::Arc<tokio::sync::RwLock<ChatStore>>,
}

impl SharedChatStore {
    /// Wrap an existing store
    pub fn new(store: ChatStore) -> Self {
        Self {
            inner: std::sync::Arc::new(tokio::sync::RwLock::new(store)),
        }
    }

    /// Create an empty store with the given settings
    pub fn with_settings(settings: Settings) -> Self {
        Self::new(ChatStore::with_settings(settings))
    }

    /// Apply one event under the write lock
    pub async fn apply(&self, event: SyncEvent) -> Outcome {
        let mut store = self.inner.write().await;
        store.apply(event)
    }

    /// Apply several events without letting other writers interleave
    pub async fn apply_all(&self, events: Vec<SyncEvent>) -> Vec<Outcome> {
        let mut store = self.inner.write().await;
        store.apply_all(events)
    }

    /// Copy of the whole store
    pub async fn snapshot(&self) -> StoreSnapshot {
        let store = self.inner.read().await;
        store.snapshot()
    }

    /// Copy of the chat list view
    pub async fn chat_list(&self) -> ChatListSnapshot {
        let store = self.inner.read().await;
        store.chat_list_snapshot()
    }

    /// Copy of the transcript view
    pub async fn message_list(&self) -> MessageListSnapshot {
        let store = self.inner.read().await;
        store.message_list_snapshot()
    }

    /// Run a read-only closure against the store
    pub async fn read<R>(&self, f: impl FnOnce(&ChatStore) -> R) -> R {
        let store = self.inner.read().await;
        f(&store)
    }

    /// Replace the settings
    pub async fn set_settings(&self, settings: Settings) {
        let mut store = self.inner.write().await;
        store.set_settings(settings);
    }
}
