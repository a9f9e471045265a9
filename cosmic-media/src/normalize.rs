//! Format normalizer
//!
//! Turns an arbitrary uploaded image into a clean 8-bit RGBA bitmap plus a
//! PNG encoding of it. Two decoders are tried in order:
//!
//! | Strategy | Decode | Re-encode |
//! |---|---|---|
//! | Sniffed | format guessed from content | RGBA PNG, best compression, adaptive filter |
//! | Hinted | format from declared MIME type or extension | default PNG |
//!
//! Inputs neither decoder can read (SVG, AVIF) produce [`MediaError::Decode`];
//! callers keep the original bytes in that case.

use crate::error::{MediaError, Result};
use crate::naming::extension;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;

/// Which decoder produced the bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    Sniffed,
    Hinted,
}

/// A decoded image ready for transparency strategies
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// PNG encoding of `pixels`
    pub png: Vec<u8>,
    pub pixels: RgbaImage,
    pub decoder: DecodeStrategy,
}

impl NormalizedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// Normalize `bytes` using the declared MIME type and filename as hints
pub fn normalize(bytes: &[u8], content_type: Option<&str>, filename: Option<&str>) -> Result<NormalizedImage> {
    let sniffed_err = match decode_sniffed(bytes) {
        Ok(image) => {
            let pixels = image.into_rgba8();
            let png = encode_png_best(&pixels)?;
            return Ok(NormalizedImage {
                png,
                pixels,
                decoder: DecodeStrategy::Sniffed,
            });
        }
        Err(e) => e,
    };

    tracing::debug!(error = %sniffed_err, "Sniffed decode failed, trying hinted decoder");

    let format = hinted_format(content_type, filename).ok_or_else(|| {
        MediaError::Decode(format!("{}; no usable format hint", sniffed_err))
    })?;

    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| MediaError::Decode(format!("{}; hinted {:?}: {}", sniffed_err, format, e)))?;

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    Ok(NormalizedImage {
        png,
        pixels: image.into_rgba8(),
        decoder: DecodeStrategy::Hinted,
    })
}

/// [`normalize`] on the blocking pool
pub async fn normalize_blocking(
    bytes: Vec<u8>,
    content_type: Option<String>,
    filename: Option<String>,
) -> Result<NormalizedImage> {
    tokio::task::spawn_blocking(move || normalize(&bytes, content_type.as_deref(), filename.as_deref()))
        .await?
}

/// Encode RGBA pixels as PNG with best compression and adaptive filtering
pub fn encode_png_best(pixels: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
    pixels.write_with_encoder(encoder)?;
    Ok(buf)
}

fn decode_sniffed(bytes: &[u8]) -> Result<DynamicImage> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    Ok(image)
}

fn hinted_format(content_type: Option<&str>, filename: Option<&str>) -> Option<ImageFormat> {
    content_type
        .and_then(ImageFormat::from_mime_type)
        .or_else(|| filename.and_then(extension).and_then(ImageFormat::from_extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbImage};

    fn jpeg_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(4, 3, image::Rgb([200, 10, 10]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    #[test]
    fn test_sniffed_jpeg_becomes_rgba_png() {
        let normalized = normalize(&jpeg_bytes(), Some("image/jpeg"), Some("a.jpg")).unwrap();

        assert_eq!(normalized.decoder, DecodeStrategy::Sniffed);
        assert_eq!(normalized.dimensions(), (4, 3));
        assert!(normalized.png.starts_with(b"\x89PNG"));

        let reread = image::load_from_memory(&normalized.png).unwrap();
        assert_eq!(reread.color(), image::ColorType::Rgba8);
    }

    #[test]
    fn test_mislabelled_input_still_sniffed() {
        // PNG content declared as JPEG
        let mut png = Vec::new();
        RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]))
            .write_with_encoder(PngEncoder::new(&mut png))
            .unwrap();

        let normalized = normalize(&png, Some("image/jpeg"), Some("a.jpg")).unwrap();
        assert_eq!(normalized.pixels.get_pixel(0, 0), &Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_svg_is_decode_error() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"></svg>"#;
        let result = normalize(svg, Some("image/svg+xml"), Some("logo.svg"));
        assert!(matches!(result, Err(MediaError::Decode(_))));
    }

    #[test]
    fn test_garbage_with_hint_is_decode_error() {
        let result = normalize(b"not an image", Some("image/png"), Some("a.png"));
        assert!(matches!(result, Err(MediaError::Decode(_))));
    }

    #[tokio::test]
    async fn test_normalize_blocking() {
        let normalized = normalize_blocking(jpeg_bytes(), None, None).await.unwrap();
        assert_eq!(normalized.dimensions(), (4, 3));
    }
}
