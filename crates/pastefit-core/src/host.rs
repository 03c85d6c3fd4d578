//! Seams between the resize core and the application hosting it.
//!
//! The core never touches an editor or a dialog directly. A host supplies an
//! [`AttachmentStore`] for persistence and a [`Prompt`] for user interaction.

use pastefit_common::Result;
use std::path::{Path, PathBuf};

/// Where pasted and batch-processed images live
pub trait AttachmentStore: Send + Sync {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write `bytes` to `path`, replacing any existing file
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// A path for `file_name` that does not collide with an existing attachment
    fn available_path(&self, file_name: &str) -> Result<PathBuf>;

    /// Every image eligible for batch resizing
    fn list_images(&self) -> Result<Vec<PathBuf>>;

    /// Embed link to insert at the cursor for `path`
    fn link_for(&self, path: &Path) -> String;
}

/// User-facing confirmation and notices
pub trait Prompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;

    fn notify(&self, message: &str);
}
