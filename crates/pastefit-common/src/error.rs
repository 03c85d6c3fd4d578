use std::path::PathBuf;

/// Unified error type for all pastefit operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Input bytes are not a valid or recognized image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Resampled pixels could not be serialized to the target format
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// A well-formed image that needs more memory than the decode cap allows
    #[error("Image exceeds the decode limit: {0}")]
    LimitExceeded(String),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid resize policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid file path: {0}")]
    InvalidPath(PathBuf),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Clipboard payload contains no image")]
    NoImage,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    TaskFailed(String),
}

impl Error {
    /// True for failures of the resize pipeline itself rather than of the host
    pub fn is_image_error(&self) -> bool {
        matches!(
            self,
            Self::Decode(_) | Self::Encode(_) | Self::LimitExceeded(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_errors_are_told_apart_from_host_errors() {
        assert!(Error::Decode("bad".to_string()).is_image_error());
        assert!(Error::Encode("bad".to_string()).is_image_error());
        assert!(Error::LimitExceeded("too big".to_string()).is_image_error());

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::from(io).is_image_error());
        assert!(!Error::FileNotFound(PathBuf::from("a.png")).is_image_error());
        assert!(!Error::TaskFailed("panicked".to_string()).is_image_error());
    }
}
