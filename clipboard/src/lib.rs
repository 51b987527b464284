//! Text clipboard access for the QR Studio UI.
//!
//! The "Copy" actions of every tab (payload text, scanned text, history entries) go
//! through [`ClipboardProvider`], so the UI can be exercised in tests without touching
//! the real system clipboard.
//!
//! # Architecture
//!
//! - [`ClipboardProvider`]: generic interface for clipboard access
//! - [`SystemClipboard`]: production implementation using the arboard crate (native only)
//! - [`MemoryClipboard`]: in-process clipboard for tests, optionally denying access
//!
//! # Example
//!
//! ```rust
//! use qrkit_clipboard::{ClipboardProvider, MemoryClipboard};
//!
//! let clipboard = MemoryClipboard::default();
//! clipboard.set_text("https://example.com").unwrap();
//! assert_eq!(clipboard.get_text().unwrap().as_deref(), Some("https://example.com"));
//! ```

use std::sync::Mutex;

/// Error types for clipboard operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    /// The platform refused access to the clipboard.
    #[error("Clipboard access denied")]
    Denied,
    /// Failed to access the clipboard.
    #[error("Clipboard access error: {0}")]
    AccessError(String),
}

/// Trait for clipboard text access, enabling mock implementations for testing.
pub trait ClipboardProvider: Send + Sync {
    /// Replaces the clipboard contents with `text`.
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;

    /// Reads text from the clipboard.
    ///
    /// # Returns
    /// - `Ok(Some(text))` if text is available
    /// - `Ok(None)` if the clipboard is accessible but holds no text
    /// - `Err(...)` if clipboard access failed
    fn get_text(&self) -> Result<Option<String>, ClipboardError>;
}

/// System clipboard implementation using the `arboard` crate.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default, Clone, Copy, Debug)]
pub struct SystemClipboard;

#[cfg(not(target_arch = "wasm32"))]
impl ClipboardProvider for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        use arboard::Clipboard;

        let mut clipboard =
            Clipboard::new().map_err(|e| ClipboardError::AccessError(e.to_string()))?;
        clipboard
            .set_text(text.to_owned())
            .map_err(|e| ClipboardError::AccessError(e.to_string()))?;

        log::debug!("Copied {} bytes of text to the clipboard", text.len());
        Ok(())
    }

    fn get_text(&self) -> Result<Option<String>, ClipboardError> {
        use arboard::Clipboard;

        let mut clipboard =
            Clipboard::new().map_err(|e| ClipboardError::AccessError(e.to_string()))?;

        match clipboard.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(ClipboardError::AccessError(e.to_string())),
        }
    }
}

/// In-memory clipboard.
///
/// With `deny` set every call fails with [`ClipboardError::Denied`], which mirrors a
/// platform that refuses clipboard access.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: Mutex<Option<String>>,
    deny: bool,
}

impl MemoryClipboard {
    /// A clipboard that rejects every access.
    pub fn denied() -> Self {
        Self {
            text: Mutex::new(None),
            deny: true,
        }
    }

    /// The text most recently copied, if any.
    pub fn contents(&self) -> Option<String> {
        self.text.lock().ok().and_then(|text| text.clone())
    }
}

impl ClipboardProvider for MemoryClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.deny {
            return Err(ClipboardError::Denied);
        }
        let mut guard = self
            .text
            .lock()
            .map_err(|e| ClipboardError::AccessError(e.to_string()))?;
        *guard = Some(text.to_owned());
        Ok(())
    }

    fn get_text(&self) -> Result<Option<String>, ClipboardError> {
        if self.deny {
            return Err(ClipboardError::Denied);
        }
        Ok(self.contents())
    }
}
