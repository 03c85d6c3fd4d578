use pastefit_common::{Error, Result};

/// Pixel extent of a decoded image. Both axes are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> u64 {
        (self.width as u64) * (self.height as u64)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// True when neither axis exceeds the given bounds
    pub fn fits_within(&self, max_width: u32, max_height: u32) -> bool {
        self.width <= max_width && self.height <= max_height
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Image metadata extracted during decoding
#[derive(Debug, Clone)]
pub struct ImageMetadata {
    pub dimensions: Dimensions,
    /// Container sniffed from the bytes, independent of any declared MIME type
    pub source_format: image::ImageFormat,
    pub color_type: image::ColorType,
    pub has_alpha: bool,
}

impl ImageMetadata {
    pub fn estimated_memory_mb(&self) -> f32 {
        let bytes = self.dimensions.pixel_count() * self.color_type.bytes_per_pixel() as u64;
        bytes as f32 / (1024.0 * 1024.0)
    }
}
