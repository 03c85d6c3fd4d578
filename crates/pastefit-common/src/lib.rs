pub mod error;
pub mod format;
pub mod path;

pub use error::{Error, Result};
pub use format::{extension_for, mime_for_extension, MediaFormat, BATCH_EXTENSIONS};
pub use path::PathManager;
