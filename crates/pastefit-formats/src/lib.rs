pub mod decoder;
pub mod encoder;
pub mod metadata;

pub use decoder::{ImageDecoder, DEFAULT_MAX_DECODE_BYTES};
pub use encoder::ImageEncoder;
pub use metadata::{Dimensions, ImageMetadata};
