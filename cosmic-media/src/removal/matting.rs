//! In-process segmentation
//!
//! A salient-object model (ISNet family) predicts a foreground probability
//! for every pixel of a square, downscaled copy of the image. The mask is
//! scaled back up and becomes the alpha channel. Models implement
//! [`MaskModel`]; the ONNX Runtime one lives behind the `onnx` feature.

use super::{StrategyKind, TransparencyStrategy};
use crate::error::{MediaError, Result};
use crate::normalize::{encode_png_best, NormalizedImage};
use async_trait::async_trait;
use cosmic_common::config::BackgroundRemovalConfig;
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Per-channel normalization used by ISNet: (value - 128) / 256
const CHANNEL_MEAN: f32 = 128.0;
const CHANNEL_STD: f32 = 256.0;

/// A model mapping an image tensor to a foreground mask
pub trait MaskModel: Send + Sync {
    /// Edge length of the square model input
    fn input_size(&self) -> u32;

    /// `input` is a 1x3xSxS planar RGB tensor; returns SxS probabilities
    fn predict(&self, input: &[f32]) -> Result<Vec<f32>>;
}

/// Resize to the model edge and lay out planar normalized RGB
pub fn prepare_input(pixels: &RgbaImage, size: u32) -> Vec<f32> {
    let scaled = imageops::resize(pixels, size, size, FilterType::Triangle);
    let plane = (size * size) as usize;
    let mut tensor = vec![0.0; plane * 3];
    for (i, pixel) in scaled.pixels().enumerate() {
        for channel in 0..3 {
            tensor[channel * plane + i] = (f32::from(pixel.0[channel]) - CHANNEL_MEAN) / CHANNEL_STD;
        }
    }
    tensor
}

/// Scale a square mask to the image and merge it into alpha (never raising it)
pub fn apply_mask(pixels: &mut RgbaImage, mask: &[f32], size: u32) -> Result<()> {
    let levels: Vec<u8> = mask
        .iter()
        .map(|p| (p.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();
    let mask = GrayImage::from_raw(size, size, levels).ok_or_else(|| {
        MediaError::Segmentation(format!(
            "Model returned {} values, expected {}",
            mask.len(),
            size * size
        ))
    })?;

    let (width, height) = pixels.dimensions();
    let mask = imageops::resize(&mask, width, height, FilterType::Triangle);
    for (pixel, level) in pixels.pixels_mut().zip(mask.pixels()) {
        pixel.0[3] = pixel.0[3].min(level.0[0]);
    }
    Ok(())
}

pub struct LocalSegmenter {
    model: Option<Arc<dyn MaskModel>>,
}

impl LocalSegmenter {
    pub fn new(model: Arc<dyn MaskModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn disabled() -> Self {
        Self { model: None }
    }

    /// Load the configured model; a missing or unloadable model disables the strategy
    pub fn from_config(config: &BackgroundRemovalConfig) -> Self {
        let Some(path) = &config.model_path else {
            return Self::disabled();
        };

        match load_model(path) {
            Ok(model) => {
                info!("✓ Segmentation model loaded from {}", path.display());
                Self::new(model)
            }
            Err(e) => {
                warn!(model = %path.display(), error = %e, "Segmentation model unavailable");
                Self::disabled()
            }
        }
    }
}

#[cfg(feature = "onnx")]
fn load_model(path: &Path) -> Result<Arc<dyn MaskModel>> {
    Ok(Arc::new(super::onnx::OnnxMaskModel::load(path)?))
}

#[cfg(not(feature = "onnx"))]
fn load_model(path: &Path) -> Result<Arc<dyn MaskModel>> {
    Err(MediaError::Segmentation(format!(
        "{} needs a build with the onnx feature",
        path.display()
    )))
}

#[async_trait]
impl TransparencyStrategy for LocalSegmenter {
    fn name(&self) -> &'static str {
        "local-segmentation"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Segmentation
    }

    fn is_available(&self) -> bool {
        self.model.is_some()
    }

    async fn apply(&self, input: &NormalizedImage) -> Result<Vec<u8>> {
        let model = self
            .model
            .clone()
            .ok_or_else(|| MediaError::Segmentation("No model loaded".to_string()))?;
        let mut pixels = input.pixels.clone();

        tokio::task::spawn_blocking(move || {
            let size = model.input_size();
            let mask = model.predict(&prepare_input(&pixels, size))?;
            apply_mask(&mut pixels, &mask, size)?;
            encode_png_best(&pixels)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::sync::Mutex;

    /// Foreground is the left half of the model input
    struct HalfMask {
        size: u32,
        seen: Mutex<Vec<f32>>,
    }

    impl MaskModel for HalfMask {
        fn input_size(&self) -> u32 {
            self.size
        }

        fn predict(&self, input: &[f32]) -> Result<Vec<f32>> {
            *self.seen.lock().unwrap() = input.to_vec();
            let size = self.size as usize;
            Ok((0..size * size)
                .map(|i| if i % size < size / 2 { 1.0 } else { 0.0 })
                .collect())
        }
    }

    struct Truncated;

    impl MaskModel for Truncated {
        fn input_size(&self) -> u32 {
            4
        }

        fn predict(&self, _input: &[f32]) -> Result<Vec<f32>> {
            Ok(vec![1.0; 3])
        }
    }

    fn normalized(pixels: RgbaImage) -> NormalizedImage {
        NormalizedImage {
            png: encode_png_best(&pixels).unwrap(),
            pixels,
            decoder: crate::normalize::DecodeStrategy::Sniffed,
        }
    }

    #[test]
    fn test_prepare_input_is_planar_and_normalized() {
        let pixels = RgbaImage::from_pixel(2, 2, Rgba([255, 128, 0, 255]));
        let tensor = prepare_input(&pixels, 4);

        assert_eq!(tensor.len(), 3 * 16);
        assert!(tensor[..16].iter().all(|v| (*v - 0.49609375).abs() < 1e-6));
        assert!(tensor[16..32].iter().all(|v| v.abs() < 1e-6));
        assert!(tensor[32..].iter().all(|v| (*v + 0.5).abs() < 1e-6));
    }

    #[tokio::test]
    async fn test_mask_becomes_alpha() {
        let model = Arc::new(HalfMask {
            size: 4,
            seen: Mutex::new(Vec::new()),
        });
        let segmenter = LocalSegmenter::new(model.clone());
        let input = normalized(RgbaImage::from_pixel(8, 8, Rgba([40, 80, 120, 255])));

        let png = segmenter.apply(&input).await.unwrap();

        assert_eq!(model.seen.lock().unwrap().len(), 3 * 16);
        let cutout = image::load_from_memory(&png).unwrap().into_rgba8();
        assert_eq!(cutout.dimensions(), (8, 8));
        assert_eq!(cutout.get_pixel(0, 0).0, [40, 80, 120, 255]);
        assert_eq!(cutout.get_pixel(7, 7).0[3], 0);
    }

    #[test]
    fn test_mask_never_raises_alpha() {
        let mut pixels = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 90]));
        apply_mask(&mut pixels, &[1.0; 4], 2).unwrap();
        assert!(pixels.pixels().all(|p| p.0[3] == 90));
    }

    #[tokio::test]
    async fn test_wrong_mask_length_fails() {
        let segmenter = LocalSegmenter::new(Arc::new(Truncated));
        let input = normalized(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])));

        let err = segmenter.apply(&input).await.unwrap_err();
        assert!(matches!(err, MediaError::Segmentation(_)));
    }

    #[test]
    fn test_unconfigured_is_unavailable() {
        let segmenter = LocalSegmenter::from_config(&BackgroundRemovalConfig::default());
        assert!(!segmenter.is_available());
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn test_model_path_without_runtime_is_unavailable() {
        let config = BackgroundRemovalConfig {
            model_path: Some("/models/isnet-fp16.onnx".into()),
            ..BackgroundRemovalConfig::default()
        };
        assert!(!LocalSegmenter::from_config(&config).is_available());
    }
}
