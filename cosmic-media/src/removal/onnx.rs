//! ONNX Runtime mask model (`onnx` feature)

use super::matting::MaskModel;
use crate::error::{MediaError, Result};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

/// ISNet models take 1024x1024 input
const ISNET_INPUT_SIZE: u32 = 1024;

pub struct OnnxMaskModel {
    session: Session,
    input_size: u32,
}

fn onnx_error(err: ort::Error) -> MediaError {
    MediaError::Segmentation(format!("ONNX runtime: {}", err))
}

impl OnnxMaskModel {
    pub fn load(path: &Path) -> Result<Self> {
        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.commit_from_file(path))
            .map_err(onnx_error)?;

        Ok(Self {
            session,
            input_size: ISNET_INPUT_SIZE,
        })
    }
}

impl MaskModel for OnnxMaskModel {
    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn predict(&self, input: &[f32]) -> Result<Vec<f32>> {
        let size = self.input_size as usize;
        let tensor = Tensor::from_array(([1usize, 3, size, size], input.to_vec())).map_err(onnx_error)?;
        let outputs = self
            .session
            .run(ort::inputs![tensor].map_err(onnx_error)?)
            .map_err(onnx_error)?;
        let mask = outputs[0].try_extract_tensor::<f32>().map_err(onnx_error)?;
        Ok(mask.iter().copied().collect())
    }
}
