use crate::host::{AttachmentStore, Prompt};
use crate::policy::ResizePolicy;
use crate::report::SizeReduction;
use crate::resize::{ImageBuffer, ResizeEngine};
use pastefit_common::{extension_for, PathManager, Result};
use pastefit_formats::Dimensions;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    File,
    Text,
}

/// One entry of a clipboard payload
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub kind: ItemKind,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ClipboardItem {
    pub fn file(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            kind: ItemKind::File,
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Text,
            mime_type: "text/plain".to_string(),
            bytes: text.into().into_bytes(),
        }
    }

    fn is_image(&self) -> bool {
        self.kind == ItemKind::File && self.mime_type.starts_with("image/")
    }
}

/// A stored paste, ready for link insertion
#[derive(Debug, Clone)]
pub struct PastedImage {
    pub path: PathBuf,
    /// Markdown embed to insert at the cursor
    pub link: String,
    pub original_size: u64,
    pub stored_size: u64,
    /// Set when the image was shrunk
    pub new_dimensions: Option<Dimensions>,
    pub reduction: Option<SizeReduction>,
}

/// Turns pasted images into resized attachments
pub struct PasteHandler<S> {
    store: S,
    policy: ResizePolicy,
}

impl<S: AttachmentStore> PasteHandler<S> {
    pub fn new(store: S, policy: ResizePolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle a paste payload.
    ///
    /// Returns `Ok(None)` when the payload has no image so the host can run
    /// its default paste. On failure nothing is written and the error is
    /// reported through `prompt` before being returned.
    pub fn handle_paste(
        &self,
        items: Vec<ClipboardItem>,
        prompt: &dyn Prompt,
    ) -> Result<Option<PastedImage>> {
        let Some(item) = items.into_iter().find(ClipboardItem::is_image) else {
            return Ok(None);
        };

        match self.store_image(ImageBuffer::new(item.bytes, item.mime_type)) {
            Ok(pasted) => {
                if let Some(reduction) = &pasted.reduction {
                    prompt.notify(&reduction.to_string());
                }
                Ok(Some(pasted))
            }
            Err(e) => {
                // The prompt is the user-facing report
                tracing::debug!("Error resizing and pasting image: {:?}", e);
                prompt.notify(&format!("Failed to resize image: {}", e));
                Err(e)
            }
        }
    }

    fn store_image(&self, original: ImageBuffer) -> Result<PastedImage> {
        let original_size = original.len() as u64;

        let outcome = ResizeEngine::resize_auto(&original, &self.policy)?;
        let new_dimensions = outcome.new_dimensions();
        let stored = outcome.into_buffer(original);

        let file_name = PathManager::pasted_image_name(extension_for(stored.mime_type()));
        let path = self.store.available_path(&file_name)?;
        self.store.write(&path, stored.bytes())?;

        let stored_size = stored.len() as u64;
        tracing::info!("Pasted image saved to {:?} ({} bytes)", path, stored_size);

        Ok(PastedImage {
            link: self.store.link_for(&path),
            path,
            original_size,
            stored_size,
            new_dimensions,
            reduction: SizeReduction::between(original_size, stored_size),
        })
    }
}
