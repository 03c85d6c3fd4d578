use crate::policy::ResizePolicy;
use pastefit_common::{MediaFormat, Result};
use pastefit_formats::{Dimensions, ImageDecoder, ImageEncoder};

/// Encoded image bytes plus the declared MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    bytes: Vec<u8>,
    mime_type: String,
}

impl ImageBuffer {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Result of a resize call
#[derive(Debug, Clone, PartialEq)]
pub enum ResizeOutcome {
    /// Input already fits the policy; the caller keeps its original buffer
    Unchanged,
    Resized {
        buffer: ImageBuffer,
        new_dimensions: Dimensions,
    },
}

impl ResizeOutcome {
    pub fn is_resized(&self) -> bool {
        matches!(self, Self::Resized { .. })
    }

    pub fn new_dimensions(&self) -> Option<Dimensions> {
        match self {
            Self::Unchanged => None,
            Self::Resized { new_dimensions, .. } => Some(*new_dimensions),
        }
    }

    /// The buffer to persist: the resized one, or `original` when unchanged
    pub fn into_buffer(self, original: ImageBuffer) -> ImageBuffer {
        match self {
            Self::Unchanged => original,
            Self::Resized { buffer, .. } => buffer,
        }
    }
}

/// Compute the fitted size for `original`, or `None` when no resize is needed.
///
/// The scale is `min(max_w / w, max_h / h, 1.0)`, so images are never
/// enlarged. Axes are rounded half away from zero and clamped to at least 1.
pub fn target_dimensions(original: Dimensions, policy: &ResizePolicy) -> Option<Dimensions> {
    let width = original.width() as f64;
    let height = original.height() as f64;

    let ratio = (policy.max_width() as f64 / width)
        .min(policy.max_height() as f64 / height)
        .min(1.0);

    if ratio == 1.0 {
        return None;
    }

    let new_width = ((width * ratio).round() as u32).clamp(1, policy.max_width());
    let new_height = ((height * ratio).round() as u32).clamp(1, policy.max_height());

    // both axes are at least 1 here
    Dimensions::new(new_width, new_height).ok()
}

/// Output format for a declared MIME type. Formats without a raster encoder fall back to PNG.
pub fn output_format(mime_type: &str) -> MediaFormat {
    MediaFormat::from_mime(mime_type)
        .filter(MediaFormat::is_encodable)
        .unwrap_or(MediaFormat::Png)
}

/// Stateless resize engine: decode, resample, re-encode
pub struct ResizeEngine;

impl ResizeEngine {
    /// Fit `input` (of size `original`) inside the policy bounds.
    ///
    /// Returns `Unchanged` without decoding when the image already fits.
    pub fn resize(
        input: &ImageBuffer,
        original: Dimensions,
        policy: &ResizePolicy,
    ) -> Result<ResizeOutcome> {
        let Some(target) = target_dimensions(original, policy) else {
            tracing::debug!(
                "{} fits within {}x{}, leaving unchanged",
                original,
                policy.max_width(),
                policy.max_height()
            );
            return Ok(ResizeOutcome::Unchanged);
        };

        let (img, metadata) =
            ImageDecoder::decode_with_limit(input.bytes(), policy.max_decode_bytes())?;
        if metadata.dimensions != original {
            tracing::warn!(
                "Declared size {} differs from decoded size {}",
                original,
                metadata.dimensions
            );
        }

        let resized = img.resize_exact(target.width(), target.height(), policy.filter().into());
        drop(img);

        let format = output_format(input.mime_type());
        let bytes = ImageEncoder::encode(&resized, format, policy.quality())?;

        tracing::info!(
            "Resized {} → {} as {} ({} → {} bytes)",
            original,
            target,
            format,
            input.len(),
            bytes.len()
        );

        Ok(ResizeOutcome::Resized {
            buffer: ImageBuffer::new(bytes, format.mime_type()),
            new_dimensions: target,
        })
    }

    /// Like [`ResizeEngine::resize`], reading the dimensions from the image header.
    ///
    /// Vector images have no pixel extent to bound and pass through unchanged.
    pub fn resize_auto(input: &ImageBuffer, policy: &ResizePolicy) -> Result<ResizeOutcome> {
        if MediaFormat::from_mime(input.mime_type()) == Some(MediaFormat::Svg) {
            return Ok(ResizeOutcome::Unchanged);
        }

        let original = ImageDecoder::read_dimensions(input.bytes())?;
        Self::resize(input, original, policy)
    }
}
