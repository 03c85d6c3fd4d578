pub mod batch;
pub mod host;
pub mod paste;
pub mod policy;
pub mod report;
pub mod resize;
pub mod store;

pub use batch::{BatchProgress, BatchResizer, CancelFlag};
pub use host::{AttachmentStore, Prompt};
pub use paste::{ClipboardItem, ItemKind, PasteHandler, PastedImage};
pub use policy::{ResampleFilter, ResizePolicy};
pub use report::{format_megabytes, BatchSummary, SizeReduction};
pub use resize::{output_format, target_dimensions, ImageBuffer, ResizeEngine, ResizeOutcome};
pub use store::VaultStore;
pub use pastefit_formats::{Dimensions, DEFAULT_MAX_DECODE_BYTES};
