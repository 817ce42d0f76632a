//! System clipboard access

use anyhow::{Context, Result};
use log::info;

/// Put `text` on the system clipboard
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Clipboard is not available")?;
    clipboard
        .set_text(text.to_string())
        .context("Failed to copy to clipboard")?;
    info!("Copied {} bytes to the clipboard", text.len());
    Ok(())
}
