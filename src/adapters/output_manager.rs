use arboard::Clipboard;
#[cfg(target_os = "linux")]
use arboard::SetExtLinux;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::domain::error::DomainError;
use crate::ports::OutputManager;

/// OutputManager that places the link on the system clipboard.
///
/// Note: This replaces the user's clipboard content. On Linux the selection
/// belongs to this process, so `copy_text` blocks until another program takes
/// it over (a clipboard manager does so at once). See [`holds_selection`].
pub struct ClipboardOutputManager {
    clipboard: Mutex<Clipboard>,
}

impl ClipboardOutputManager {
    /// Create a new ClipboardOutputManager.
    pub fn new() -> Result<Self, DomainError> {
        let clipboard = Clipboard::new()
            .map_err(|e| DomainError::Clipboard(format!("Failed to initialize clipboard: {}", e)))?;

        Ok(Self {
            clipboard: Mutex::new(clipboard),
        })
    }

    /// Set text to clipboard.
    fn set_clipboard_text(&self, text: &str) -> Result<(), DomainError> {
        let mut clipboard = self.clipboard.lock();

        #[cfg(target_os = "linux")]
        let result = clipboard.set().wait().text(text);
        #[cfg(not(target_os = "linux"))]
        let result = clipboard.set_text(text);

        result.map_err(|e| DomainError::Clipboard(format!("Failed to set clipboard text: {}", e)))?;
        debug!("Set clipboard text ({} chars)", text.len());
        Ok(())
    }
}

/// Whether the copied text lives only as long as this process owns the
/// selection, which makes `copy_text` wait for another owner.
pub const fn holds_selection() -> bool {
    cfg!(target_os = "linux")
}

#[async_trait]
impl OutputManager for ClipboardOutputManager {
    async fn copy_text(&self, text: &str) -> Result<(), DomainError> {
        if text.is_empty() {
            debug!("Empty text, skipping clipboard copy");
            return Ok(());
        }

        self.set_clipboard_text(text)?;
        info!("Link copied to clipboard");
        Ok(())
    }
}
