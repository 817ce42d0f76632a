//! slidekit editor - editing sessions over slide decks
//!
//! This crate holds the stateful side of slidekit:
//! - The editing session with its cursor and slide operations
//! - Image storage next to the deck
//! - Autosave snapshots
//! - File watching and clipboard access (optional features)

pub mod autosave;
pub mod image_store;
pub mod session;

#[cfg(feature = "clipboard")]
pub mod clipboard;
#[cfg(feature = "watch")]
pub mod watcher;

// Re-export main types
pub use autosave::{AutoSave, Snapshot};
pub use image_store::{ImageStore, StoredImage};
pub use session::{EditorSession, ImageInput, Insertion};

#[cfg(feature = "clipboard")]
pub use clipboard::copy_to_clipboard;
#[cfg(feature = "watch")]
pub use watcher::{DeckChanges, DeckWatcher};
