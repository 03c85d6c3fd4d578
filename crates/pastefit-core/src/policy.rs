use image::imageops::FilterType;
use pastefit_common::{Error, Result};
use pastefit_formats::DEFAULT_MAX_DECODE_BYTES;
use std::str::FromStr;

pub const DEFAULT_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_MAX_HEIGHT: u32 = 1080;
pub const DEFAULT_QUALITY: f32 = 0.92;

/// Resampling filters offered for downscaling.
///
/// Only the smooth tiers are exposed; nearest and bilinear alias visibly
/// when shrinking screenshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleFilter {
    /// Bicubic (Catmull-Rom spline)
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CatmullRom => "catmullrom",
            Self::Gaussian => "gaussian",
            Self::Lanczos3 => "lanczos3",
        }
    }
}

impl FromStr for ResampleFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lanczos3" | "lanczos" => Ok(Self::Lanczos3),
            "catmullrom" | "catmull-rom" | "bicubic" => Ok(Self::CatmullRom),
            "gaussian" => Ok(Self::Gaussian),
            other => Err(Error::InvalidPolicy(format!(
                "unknown filter '{}' (expected lanczos3, catmullrom or gaussian)",
                other
            ))),
        }
    }
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Bounds and encoder settings applied to every resize
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizePolicy {
    max_width: u32,
    max_height: u32,
    quality: f32,
    filter: ResampleFilter,
    /// Memory a single decode may allocate
    max_decode_bytes: u64,
}

impl ResizePolicy {
    /// Build a policy. Bounds must be non-zero and `quality` must lie in `[0, 1]`.
    pub fn new(max_width: u32, max_height: u32, quality: f32) -> Result<Self> {
        if max_width == 0 || max_height == 0 {
            return Err(Error::InvalidPolicy(format!(
                "bounds must be positive, got {}x{}",
                max_width, max_height
            )));
        }

        if !(0.0..=1.0).contains(&quality) {
            return Err(Error::InvalidPolicy(format!(
                "quality must be within [0, 1], got {}",
                quality
            )));
        }

        Ok(Self {
            max_width,
            max_height,
            quality,
            filter: ResampleFilter::default(),
            max_decode_bytes: DEFAULT_MAX_DECODE_BYTES,
        })
    }

    pub fn with_filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Cap decoded memory per image. Larger images fail with `Error::LimitExceeded`.
    pub fn with_max_decode_bytes(mut self, max_decode_bytes: u64) -> Self {
        self.max_decode_bytes = max_decode_bytes;
        self
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn filter(&self) -> ResampleFilter {
        self.filter
    }

    pub fn max_decode_bytes(&self) -> u64 {
        self.max_decode_bytes
    }
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            quality: DEFAULT_QUALITY,
            filter: ResampleFilter::default(),
            max_decode_bytes: DEFAULT_MAX_DECODE_BYTES,
        }
    }
}
