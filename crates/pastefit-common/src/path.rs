use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Prefix of generated attachment names
const PASTED_IMAGE_PREFIX: &str = "pasted-image";

/// Names and places attachments inside a vault
pub struct PathManager {
    attachment_dir: PathBuf,
}

impl PathManager {
    /// Create a PathManager writing into `attachment_dir`
    pub fn new(attachment_dir: impl Into<PathBuf>) -> Self {
        Self {
            attachment_dir: attachment_dir.into(),
        }
    }

    /// Generate a timestamped attachment name
    /// Format: pasted-image-<unix millis>.ext
    pub fn pasted_image_name(extension: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        format!("{}-{}.{}", PASTED_IMAGE_PREFIX, millis, extension)
    }

    /// Resolve a path for `file_name` that does not collide with an existing file.
    /// Collisions get a numeric suffix: `name.png`, `name 1.png`, `name 2.png`, ...
    pub fn available_path(&self, file_name: &str) -> Result<PathBuf> {
        // Ensure attachment directory exists
        std::fs::create_dir_all(&self.attachment_dir)?;

        let candidate = self.attachment_dir.join(file_name);
        if !candidate.exists() {
            return Ok(candidate);
        }

        let name = Path::new(file_name);
        let stem = name
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidPath(candidate.clone()))?;
        let extension = name.extension().and_then(|s| s.to_str());

        let mut counter: u32 = 1;
        loop {
            let numbered = match extension {
                Some(ext) => format!("{} {}.{}", stem, counter, ext),
                None => format!("{} {}", stem, counter),
            };
            let path = self.attachment_dir.join(numbered);
            if !path.exists() {
                tracing::debug!("Resolved attachment collision {} → {:?}", file_name, path);
                return Ok(path);
            }
            counter += 1;
        }
    }

    /// Validate input path exists and is readable
    pub fn validate_input(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        if !path.is_file() {
            return Err(Error::InvalidPath(path.to_path_buf()));
        }

        Ok(())
    }

    /// Get attachment directory
    pub fn attachment_dir(&self) -> &Path {
        &self.attachment_dir
    }
}
