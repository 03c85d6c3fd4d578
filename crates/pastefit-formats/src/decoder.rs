use crate::metadata::{Dimensions, ImageMetadata};
use image::{DynamicImage, ImageError, ImageReader, Limits};
use pastefit_common::{Error, Result};
use std::io::Cursor;

/// Default cap on the memory a single decode may allocate: 2 GiB.
///
/// A 16000x9000 RGBA panorama needs about 550 MiB decoded, above the
/// `image` crate's own 512 MiB default.
pub const DEFAULT_MAX_DECODE_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// In-memory image decoder. The container is sniffed from the bytes.
pub struct ImageDecoder;

impl ImageDecoder {
    /// Decode the first frame of an encoded image with the default memory cap
    pub fn decode(bytes: &[u8]) -> Result<(DynamicImage, ImageMetadata)> {
        Self::decode_with_limit(bytes, DEFAULT_MAX_DECODE_BYTES)
    }

    /// Decode the first frame, allocating at most `max_alloc` bytes.
    ///
    /// Exceeding the cap is `Error::LimitExceeded`, not `Error::Decode`.
    pub fn decode_with_limit(bytes: &[u8], max_alloc: u64) -> Result<(DynamicImage, ImageMetadata)> {
        let mut reader = Self::reader(bytes)?;
        let source_format = reader
            .format()
            .ok_or_else(|| Error::Decode("unrecognized image format".to_string()))?;

        let mut limits = Limits::default();
        limits.max_alloc = Some(max_alloc);
        reader.limits(limits);

        tracing::debug!(
            "Decoding {:?} from {} bytes (cap {} bytes)",
            source_format,
            bytes.len(),
            max_alloc
        );

        let img = reader.decode().map_err(Self::decode_error)?;

        let dimensions = Dimensions::new(img.width(), img.height())
            .map_err(|e| Error::Decode(e.to_string()))?;

        let metadata = ImageMetadata {
            dimensions,
            source_format,
            color_type: img.color(),
            has_alpha: img.color().has_alpha(),
        };

        tracing::debug!(
            "Decoded {} {:?} image ({:.2}MB in memory)",
            metadata.dimensions,
            metadata.source_format,
            metadata.estimated_memory_mb()
        );

        Ok((img, metadata))
    }

    /// Read dimensions from the header without decoding pixel data
    pub fn read_dimensions(bytes: &[u8]) -> Result<Dimensions> {
        let (width, height) = Self::reader(bytes)?
            .into_dimensions()
            .map_err(|e| Error::Decode(format!("failed to read dimensions: {}", e)))?;

        Dimensions::new(width, height).map_err(|e| Error::Decode(e.to_string()))
    }

    fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>> {
        if bytes.is_empty() {
            return Err(Error::Decode("input is empty".to_string()));
        }

        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| Error::Decode(e.to_string()))
    }

    fn decode_error(error: ImageError) -> Error {
        match error {
            ImageError::Limits(e) => Error::LimitExceeded(e.to_string()),
            other => Error::Decode(other.to_string()),
        }
    }
}
