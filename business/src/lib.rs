//! Sessions, gateways and persistence behind the QR Studio UI.
//!
//! Nothing in this crate touches the UI toolkit. Sessions are plain state machines owned by
//! the UI thread; anything slow (encoding, camera frames) is described by a pending request
//! that the caller runs elsewhere and hands back as a completion.

pub mod batch;
pub mod color;
pub mod config;
pub mod decoding;
pub mod encoding;
pub mod error;
pub mod export;
pub mod formats;
pub mod generation;
pub mod history;
pub mod logo;
pub mod preview;
pub mod scanner;
pub mod shell;
pub mod store;

pub use color::QrColor;
pub use config::QrConfig;
pub use encoding::{EncodeOptions, EncodingError, EncodingGateway, ErrorCorrection, QrImage};
pub use error::ValidationError;
pub use history::{Confirmation, HistoryEntry, HistoryManager};
pub use shell::{AdvancedMode, Shell, Tab, ThemeState};
pub use store::PersistentStore;
