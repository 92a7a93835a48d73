//! Synchronization settings

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Settings for the chat store
///
/// Stored as JSON. Missing fields fall back to their defaults, so older
/// files keep loading after new options are added.
///
/// # Example
/// ```rust,no_run
/// use chatsync::store::Settings;
///
/// // Load settings (returns default if file doesn't exist)
/// let mut settings = Settings::load("chatsync.json").expect("Failed to load");
///
/// settings.message_page_size = 50;
/// settings.save("chatsync.json").expect("Failed to save");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Chats requested per page
    pub chat_page_size: u32,
    /// Messages requested per page
    pub message_page_size: u32,
    /// Drop message pages that arrive for a chat that is no longer open
    pub discard_stale_pages: bool,
    /// Let inbound messages bump their chat's recency and unread counter
    pub touch_chat_on_inbound: bool,
}

impl Settings {
    /// Read settings from `path`.
    ///
    /// A missing or blank file yields [`Settings::default`]. Fields absent
    /// from the file take their default values.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(Error::Settings(format!("cannot read {}: {}", path.display(), e)));
            }
        };
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Self = serde_json::from_str(&raw)
            .map_err(|e| Error::Settings(format!("invalid JSON in {}: {}", path.display(), e)))?;
        settings.validate()?;

        tracing::debug!(path = %path.display(), ?settings, "Loaded settings");
        Ok(settings)
    }

    /// Write settings to `path` as pretty JSON. Missing parent directories
    /// are created; invalid settings are never written.
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.validate()?;

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| {
                Error::Settings(format!("cannot create {}: {}", dir.display(), e))
            })?;
        }

        std::fs::write(path, serde_json::to_string_pretty(self)?)
            .map_err(|e| Error::Settings(format!("cannot write {}: {}", path.display(), e)))
    }

    /// Reject values the store cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.chat_page_size == 0 {
            return Err(Error::Settings("chat_page_size must be positive".to_string()));
        }
        if self.message_page_size == 0 {
            return Err(Error::Settings("message_page_size must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chat_page_size: 20,
            message_page_size: 30,
            discard_stale_pages: true,
            touch_chat_on_inbound: false,
        }
    }
}
