//! Background-removal adapter
//!
//! Runs ranked transparency strategies over a normalized image:
//! 1. **local-segmentation** - ISNet-style model run in process
//! 2. **segmentation** - remote segmentation service
//! 3. **luminance-key** - near-white pixels become transparent
//! 4. **unchanged** - the original bytes
//!
//! Unavailable strategies are skipped. Each failure is logged and recorded
//! in the outcome, and the next strategy is tried. Removal never fails as a
//! whole: the last resort is the untouched input.

mod luminance;
mod matting;
#[cfg(feature = "onnx")]
mod onnx;
mod segmentation;

pub use luminance::{apply_luminance_key, keyed_alpha, LuminanceKey};
pub use matting::{apply_mask, prepare_input, LocalSegmenter, MaskModel};
#[cfg(feature = "onnx")]
pub use onnx::OnnxMaskModel;
pub use segmentation::RemoteSegmenter;

use crate::error::Result;
use crate::normalize::{normalize_blocking, NormalizedImage};
use async_trait::async_trait;
use cosmic_common::config::BackgroundRemovalConfig;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Strategy that produced an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    Segmentation,
    LuminanceKey,
    Unchanged,
}

/// One transparency strategy in the ranked chain
#[async_trait]
pub trait TransparencyStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> StrategyKind;

    /// Whether the strategy can run at all (e.g. service configured)
    fn is_available(&self) -> bool;

    /// Produce PNG bytes with the background made transparent
    async fn apply(&self, input: &NormalizedImage) -> Result<Vec<u8>>;
}

/// A strategy that failed during a removal run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedAttempt {
    pub strategy: &'static str,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct RemovalOutcome {
    pub bytes: Vec<u8>,
    pub strategy: StrategyKind,
    pub content_type: String,
    pub attempts: Vec<FailedAttempt>,
}

impl RemovalOutcome {
    /// A transparency strategy succeeded (output is PNG)
    pub fn is_transformed(&self) -> bool {
        self.strategy != StrategyKind::Unchanged
    }
}

pub struct BackgroundRemover {
    strategies: Vec<Arc<dyn TransparencyStrategy>>,
}

impl BackgroundRemover {
    /// Strategies are tried in the given order
    pub fn new(strategies: Vec<Arc<dyn TransparencyStrategy>>) -> Self {
        Self { strategies }
    }

    /// Local model, remote service (each when configured), then luminance key
    pub fn from_config(config: &BackgroundRemovalConfig) -> Result<Self> {
        let local = LocalSegmenter::from_config(config);
        let remote = RemoteSegmenter::from_config(config)?;
        if remote.is_available() {
            info!("✓ Background segmentation service configured");
        }
        if !local.is_available() && !remote.is_available() {
            info!("No segmentation model or service configured, luminance key only");
        }
        Ok(Self::new(vec![
            Arc::new(local),
            Arc::new(remote),
            Arc::new(LuminanceKey),
        ]))
    }

    /// Names of strategies that can currently run
    pub fn available(&self) -> Vec<&'static str> {
        self.strategies
            .iter()
            .filter(|s| s.is_available())
            .map(|s| s.name())
            .collect()
    }

    pub async fn remove(&self, original: &[u8], content_type: &str, filename: &str) -> RemovalOutcome {
        let mut attempts = Vec::new();

        let normalized = match normalize_blocking(
            original.to_vec(),
            Some(content_type.to_string()),
            Some(filename.to_string()),
        )
        .await
        {
            Ok(n) => Some(n),
            Err(e) => {
                warn!(file = %filename, error = %e, "Normalization failed, keeping original image");
                attempts.push(FailedAttempt {
                    strategy: "normalize",
                    error: e.to_string(),
                });
                None
            }
        };

        if let Some(normalized) = normalized {
            for strategy in &self.strategies {
                if !strategy.is_available() {
                    debug!(strategy = strategy.name(), "Strategy unavailable, skipping");
                    continue;
                }

                match strategy.apply(&normalized).await {
                    Ok(bytes) => {
                        info!(
                            file = %filename,
                            strategy = strategy.name(),
                            size = bytes.len(),
                            "✓ Background removed"
                        );
                        return RemovalOutcome {
                            bytes,
                            strategy: strategy.kind(),
                            content_type: "image/png".to_string(),
                            attempts,
                        };
                    }
                    Err(e) => {
                        warn!(file = %filename, strategy = strategy.name(), error = %e, "Strategy failed");
                        attempts.push(FailedAttempt {
                            strategy: strategy.name(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        info!(file = %filename, "Returning original image unchanged");
        RemovalOutcome {
            bytes: original.to_vec(),
            strategy: StrategyKind::Unchanged,
            content_type: content_type.to_string(),
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        kind: StrategyKind,
        available: bool,
        fail: bool,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(kind: StrategyKind, available: bool, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                kind,
                available,
                fail,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TransparencyStrategy for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn kind(&self) -> StrategyKind {
            self.kind
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn apply(&self, _input: &NormalizedImage) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(MediaError::Segmentation("boom".to_string()))
            } else {
                Ok(b"cut-out".to_vec())
            }
        }
    }

    fn white_png() -> Vec<u8> {
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255])))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn test_first_available_strategy_wins() {
        let skipped = Scripted::new(StrategyKind::Segmentation, false, false);
        let winner = Scripted::new(StrategyKind::LuminanceKey, true, false);
        let remover = BackgroundRemover::new(vec![skipped.clone(), winner.clone()]);

        let outcome = remover.remove(&white_png(), "image/png", "a.png").await;

        assert_eq!(outcome.strategy, StrategyKind::LuminanceKey);
        assert_eq!(outcome.bytes, b"cut-out");
        assert_eq!(outcome.content_type, "image/png");
        assert!(outcome.attempts.is_empty());
        assert_eq!(skipped.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_recorded_then_fallback() {
        let failing = Scripted::new(StrategyKind::Segmentation, true, true);
        let remover = BackgroundRemover::new(vec![failing, Arc::new(LuminanceKey)]);

        let outcome = remover.remove(&white_png(), "image/png", "a.png").await;

        assert_eq!(outcome.strategy, StrategyKind::LuminanceKey);
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.attempts[0].strategy, "scripted");

        let keyed = image::load_from_memory(&outcome.bytes).unwrap().into_rgba8();
        assert_eq!(keyed.get_pixel(1, 1).0[3], 0);
    }

    #[tokio::test]
    async fn test_all_failing_returns_original() {
        let failing = Scripted::new(StrategyKind::Segmentation, true, true);
        let remover = BackgroundRemover::new(vec![failing]);
        let input = white_png();

        let outcome = remover.remove(&input, "image/webp", "a.webp").await;

        assert_eq!(outcome.strategy, StrategyKind::Unchanged);
        assert!(!outcome.is_transformed());
        assert_eq!(outcome.bytes, input);
        assert_eq!(outcome.content_type, "image/webp");
    }

    #[tokio::test]
    async fn test_undecodable_input_returns_original() {
        let remover = BackgroundRemover::new(vec![Arc::new(LuminanceKey)]);
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"/>"#.to_vec();

        let outcome = remover.remove(&svg, "image/svg+xml", "logo.svg").await;

        assert_eq!(outcome.strategy, StrategyKind::Unchanged);
        assert_eq!(outcome.bytes, svg);
        assert_eq!(outcome.attempts[0].strategy, "normalize");
    }

    #[test]
    fn test_from_config_without_endpoint() {
        let remover = BackgroundRemover::from_config(&BackgroundRemovalConfig::default()).unwrap();
        assert_eq!(remover.available(), vec!["luminance-key"]);
    }
}
