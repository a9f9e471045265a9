//! Luminance-key transparency
//!
//! Treats near-white pixels as background: brightness above 240 becomes
//! fully transparent, 200..=240 fades linearly. Alpha never increases.

use super::{StrategyKind, TransparencyStrategy};
use crate::error::Result;
use crate::normalize::{encode_png_best, NormalizedImage};
use async_trait::async_trait;
use image::RgbaImage;

// Double precision: f32 rounds some fade values the other way
const OPAQUE_BELOW: f64 = 200.0;
const CLEAR_ABOVE: f64 = 240.0;
/// 255 / (240 - 200)
const FADE_SLOPE: f64 = 6.375;

pub struct LuminanceKey;

/// Alpha for one pixel, or `None` to keep it
pub fn keyed_alpha(r: u8, g: u8, b: u8) -> Option<u8> {
    let brightness = (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0;
    if brightness > CLEAR_ABOVE {
        Some(0)
    } else if brightness > OPAQUE_BELOW {
        Some(((CLEAR_ABOVE - brightness) * FADE_SLOPE).floor() as u8)
    } else {
        None
    }
}

/// Apply the key in place
pub fn apply_luminance_key(pixels: &mut RgbaImage) {
    for pixel in pixels.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        if let Some(alpha) = keyed_alpha(r, g, b) {
            pixel.0[3] = alpha.min(a);
        }
    }
}

#[async_trait]
impl TransparencyStrategy for LuminanceKey {
    fn name(&self) -> &'static str {
        "luminance-key"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::LuminanceKey
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn apply(&self, input: &NormalizedImage) -> Result<Vec<u8>> {
        let mut pixels = input.pixels.clone();
        tokio::task::spawn_blocking(move || {
            apply_luminance_key(&mut pixels);
            encode_png_best(&pixels)
        })
        .await?
    }
}
