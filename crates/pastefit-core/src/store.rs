use crate::host::AttachmentStore;
use glob::{MatchOptions, Pattern};
use pastefit_common::{Error, PathManager, Result, BATCH_EXTENSIONS};
use std::path::{Component, Path, PathBuf};

/// Filesystem-backed attachment store rooted at a vault directory
pub struct VaultStore {
    root: PathBuf,
    paths: PathManager,
}

impl VaultStore {
    /// `attachment_folder` is relative to `root`; empty means the vault root
    pub fn new(root: impl Into<PathBuf>, attachment_folder: &str) -> Self {
        let root = root.into();
        let attachment_dir = if attachment_folder.trim().is_empty() {
            root.clone()
        } else {
            root.join(attachment_folder.trim())
        };

        Self {
            paths: PathManager::new(attachment_dir),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn attachment_dir(&self) -> &Path {
        self.paths.attachment_dir()
    }

    /// Path relative to the vault root with `/` separators
    fn vault_relative(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Sibling path used while replacing a file
    fn staging_path(path: &Path) -> Result<PathBuf> {
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;
        Ok(path.with_file_name(format!(".{}.pastefit-tmp", file_name)))
    }
}

impl AttachmentStore for VaultStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.paths.validate_input(path)?;
        Ok(std::fs::read(path)?)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write beside the target, then rename over it, so a failed write
        // never leaves a truncated image behind
        let staging = Self::staging_path(path)?;
        if let Err(e) = std::fs::write(&staging, bytes) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }
        if let Err(e) = std::fs::rename(&staging, path) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }

        tracing::debug!("Wrote {} bytes to {:?}", bytes.len(), path);
        Ok(())
    }

    fn available_path(&self, file_name: &str) -> Result<PathBuf> {
        self.paths.available_path(file_name)
    }

    fn list_images(&self) -> Result<Vec<PathBuf>> {
        // Hidden directories (.obsidian, .git, ...) are skipped
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: true,
        };

        let root = Pattern::escape(&self.root.to_string_lossy());
        let mut images = Vec::new();

        for extension in BATCH_EXTENSIONS {
            let pattern = format!("{}/**/*.{}", root, extension);
            let entries = glob::glob_with(&pattern, options)
                .map_err(|e| Error::InvalidPath(PathBuf::from(e.msg)))?;

            for entry in entries {
                match entry {
                    Ok(path) if path.is_file() => images.push(path),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Skipping unreadable entry: {}", e),
                }
            }
        }

        images.sort();
        images.dedup();
        tracing::debug!("Found {} images under {:?}", images.len(), self.root);
        Ok(images)
    }

    fn link_for(&self, path: &Path) -> String {
        format!("![]({})", self.vault_relative(path).replace(' ', "%20"))
    }
}
