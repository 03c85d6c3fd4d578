use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder as _};
use pastefit_common::{Error, MediaFormat, Result};
use std::borrow::Cow;
use std::io::Cursor;

const ONE_MB_IN_BYTES: usize = 1024 * 1024;

/// In-memory encoder with format-specific settings
pub struct ImageEncoder;

impl ImageEncoder {
    /// Encode `img` as `format`. `quality` is in `[0, 1]` and only reaches lossy encoders.
    pub fn encode(img: &DynamicImage, format: MediaFormat, quality: f32) -> Result<Vec<u8>> {
        let image_format = format
            .to_image_format()
            .ok_or_else(|| Error::Encode(format!("no raster encoder for {}", format)))?;

        tracing::debug!(
            "Encoding {}x{} as {} (quality: {})",
            img.width(),
            img.height(),
            format,
            if format.is_lossy() {
                quality.to_string()
            } else {
                "n/a".to_string()
            }
        );

        let img = Self::prepare(img, format);
        let mut buffer = Vec::with_capacity(ONE_MB_IN_BYTES);

        match format {
            MediaFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut buffer,
                    CompressionType::Best,
                    FilterType::Adaptive,
                );
                encoder
                    .write_image(img.as_bytes(), img.width(), img.height(), img.color().into())
                    .map_err(|e| Error::Encode(e.to_string()))?;
            }
            MediaFormat::Jpeg => {
                // JPEG carries no alpha channel
                let rgb = img.to_rgb8();
                let encoder = JpegEncoder::new_with_quality(&mut buffer, Self::jpeg_quality(quality));
                encoder
                    .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                    .map_err(|e| Error::Encode(e.to_string()))?;
            }
            MediaFormat::Webp => {
                // image's own WebP encoder is lossless only
                let rgba = img.to_rgba8();
                let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
                let encoded = encoder.encode(Self::webp_quality(quality));
                buffer.extend_from_slice(&encoded);
            }
            _ => {
                img.write_to(&mut Cursor::new(&mut buffer), image_format)
                    .map_err(|e| Error::Encode(e.to_string()))?;
            }
        }

        if buffer.is_empty() {
            return Err(Error::Encode(format!("{} encoder produced no output", format)));
        }

        Ok(buffer)
    }

    /// Map `[0, 1]` quality onto the JPEG encoder's 1-100 scale
    pub fn jpeg_quality(quality: f32) -> u8 {
        let scaled = (quality.clamp(0.0, 1.0) * 100.0).round() as u8;
        scaled.clamp(1, 100)
    }

    /// Map `[0, 1]` quality onto libwebp's 0-100 scale
    pub fn webp_quality(quality: f32) -> f32 {
        quality.clamp(0.0, 1.0) * 100.0
    }

    /// Convert pixel layouts the target encoder cannot take
    fn prepare(img: &DynamicImage, format: MediaFormat) -> Cow<'_, DynamicImage> {
        use image::ColorType;

        match (format, img.color()) {
            (MediaFormat::Png, ColorType::Rgb32F | ColorType::Rgba32F) => {
                Cow::Owned(DynamicImage::ImageRgba16(img.to_rgba16()))
            }
            (MediaFormat::Bmp, ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8) => {
                Cow::Borrowed(img)
            }
            (MediaFormat::Gif, ColorType::Rgba8) => Cow::Borrowed(img),
            (MediaFormat::Bmp | MediaFormat::Gif, _) => {
                Cow::Owned(DynamicImage::ImageRgba8(img.to_rgba8()))
            }
            _ => Cow::Borrowed(img),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageDecoder;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let mut img = DynamicImage::new_rgb8(width, height);
        let rgb_img = img.as_mut_rgb8().unwrap();
        for (x, y, pixel) in rgb_img.enumerate_pixels_mut() {
            let r = ((x as f32 / width as f32) * 255.0) as u8;
            let g = ((y as f32 / height as f32) * 255.0) as u8;
            let b = (((x + y) as f32 / (width + height) as f32) * 255.0) as u8;
            *pixel = image::Rgb([r, g, b]);
        }
        img
    }

    #[test]
    fn test_quality_mapping() {
        assert_eq!(ImageEncoder::jpeg_quality(0.92), 92);
        assert_eq!(ImageEncoder::jpeg_quality(0.0), 1);
        assert_eq!(ImageEncoder::jpeg_quality(1.0), 100);
        assert_eq!(ImageEncoder::webp_quality(0.5), 50.0);
    }

    #[test]
    fn test_encode_each_raster_format() {
        let img = gradient(64, 48);
        let cases = [
            (MediaFormat::Png, image::ImageFormat::Png),
            (MediaFormat::Jpeg, image::ImageFormat::Jpeg),
            (MediaFormat::Webp, image::ImageFormat::WebP),
            (MediaFormat::Gif, image::ImageFormat::Gif),
            (MediaFormat::Bmp, image::ImageFormat::Bmp),
        ];

        for (format, expected) in cases {
            let bytes = ImageEncoder::encode(&img, format, 0.92).unwrap();
            assert_eq!(image::guess_format(&bytes).unwrap(), expected, "{}", format);

            let dims = ImageDecoder::read_dimensions(&bytes).unwrap();
            assert_eq!((dims.width(), dims.height()), (64, 48));
        }
    }

    #[test]
    fn test_lower_jpeg_quality_is_not_larger() {
        let img = gradient(320, 240);
        let high = ImageEncoder::encode(&img, MediaFormat::Jpeg, 0.95).unwrap();
        let low = ImageEncoder::encode(&img, MediaFormat::Jpeg, 0.3).unwrap();
        assert!(low.len() <= high.len());
    }

    #[test]
    fn test_png_ignores_quality() {
        let img = gradient(32, 32);
        let a = ImageEncoder::encode(&img, MediaFormat::Png, 0.1).unwrap();
        let b = ImageEncoder::encode(&img, MediaFormat::Png, 1.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_svg_is_encode_error() {
        let img = gradient(8, 8);
        assert!(matches!(
            ImageEncoder::encode(&img, MediaFormat::Svg, 0.92),
            Err(Error::Encode(_))
        ));
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let img = DynamicImage::new_rgba8(16, 16);
        let bytes = ImageEncoder::encode(&img, MediaFormat::Jpeg, 0.92).unwrap();
        let (decoded, _) = ImageDecoder::decode(&bytes).unwrap();
        assert!(!decoded.color().has_alpha());
    }
}
