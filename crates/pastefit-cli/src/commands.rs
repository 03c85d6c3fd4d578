use crate::config::Config;
use anyhow::Result;
use pastefit_common::mime_for_extension;
use pastefit_core::{ClipboardItem, PasteHandler, PastedImage, Prompt, VaultStore};
use std::path::Path;

/// How a paste command ended
#[derive(Debug)]
pub enum PasteStatus {
    Pasted(PastedImage),
    /// The payload held no image; nothing was written
    NotAnImage,
    /// The failure has already been reported through the prompt
    Failed,
}

/// Declared MIME type for a pasted file: the explicit one, else the extension's
pub fn declared_mime(input: &Path, mime: Option<String>) -> String {
    mime.unwrap_or_else(|| {
        input
            .extension()
            .and_then(|ext| ext.to_str())
            .map(mime_for_extension)
            .unwrap_or("image/png")
            .to_string()
    })
}

/// Paste `bytes` into the vault at `vault`.
///
/// Resize failures are reported by `prompt` and come back as
/// [`PasteStatus::Failed`]; only setup errors are returned as `Err`.
pub fn paste_bytes(
    bytes: Vec<u8>,
    mime_type: String,
    vault: &Path,
    config: &Config,
    prompt: &dyn Prompt,
) -> Result<PasteStatus> {
    let store = VaultStore::new(vault, &config.attachment_folder);
    let handler = PasteHandler::new(store, config.policy()?);

    let status = match handler.handle_paste(vec![ClipboardItem::file(mime_type, bytes)], prompt) {
        Ok(Some(pasted)) => PasteStatus::Pasted(pasted),
        Ok(None) => PasteStatus::NotAnImage,
        Err(_) => PasteStatus::Failed,
    };

    Ok(status)
}
