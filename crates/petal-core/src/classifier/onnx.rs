//! ONNX Runtime classifier session.
//!
//! Loads an image classifier exported to ONNX and runs one forward pass per
//! call, returning the raw score vector from the first output.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::PipelineError;

use super::Classifier;

/// Wraps an ONNX Runtime session for single-image classification.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
    /// Score vector length, learned by a probe run at load time.
    output_len: usize,
    model_path: PathBuf,
}

impl OnnxClassifier {
    /// Load a classifier from an ONNX file and probe its output length.
    ///
    /// `probe` must have the shape the model expects; its contents are
    /// irrelevant (zeros are fine).
    pub fn load(model_path: &Path, probe: &Array4<f32>) -> Result<Self, PipelineError> {
        if !model_path.exists() {
            return Err(PipelineError::Model {
                path: model_path.to_path_buf(),
                message: "Model not found. Set `general.model_dir` / `model.file` \
                          or pass --model."
                    .to_string(),
            });
        }

        let session = Session::builder()
            .map_err(|e| PipelineError::Model {
                path: model_path.to_path_buf(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| PipelineError::Model {
                path: model_path.to_path_buf(),
                message: format!("Failed to load ONNX model: {e}"),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| PipelineError::Model {
                path: model_path.to_path_buf(),
                message: "Model declares no inputs".to_string(),
            })?;

        tracing::debug!(
            "Loaded classifier from {:?} (input: {:?}, outputs: {:?})",
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        let mut classifier = Self {
            session: Mutex::new(session),
            input_name,
            output_len: 0,
            model_path: model_path.to_path_buf(),
        };

        // Dynamic output dims are common in exported models, so the
        // cardinality is measured rather than read from metadata.
        let scores = classifier.run(probe).map_err(|e| PipelineError::Model {
            path: model_path.to_path_buf(),
            message: format!("Probe inference failed: {e}"),
        })?;
        classifier.output_len = scores.len();
        tracing::info!(
            "Classifier ready: {} classes, input {:?}",
            classifier.output_len,
            probe.shape()
        );

        Ok(classifier)
    }

    /// Path the model was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn run(&self, input: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        // Convert ndarray to (shape, flat_data) for ort.
        let shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = input.iter().copied().collect();

        let input_value =
            Value::from_array((shape, flat_data)).map_err(|e| PipelineError::Inference {
                message: format!("Failed to create input tensor: {e}"),
            })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self.session.lock().map_err(|e| PipelineError::Inference {
            message: format!("Session lock poisoned: {e}"),
        })?;

        let outputs = session.run(inputs).map_err(|e| PipelineError::Inference {
            message: format!("ONNX inference failed: {e}"),
        })?;

        let (_, first) = outputs
            .iter()
            .next()
            .ok_or_else(|| PipelineError::Inference {
                message: "Model produced no outputs".to_string(),
            })?;

        let (shape, data) =
            first
                .try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::Inference {
                    message: format!("Failed to extract score tensor: {e}"),
                })?;

        // Scores are [N] or [1, N]; anything else is not a single-image classifier.
        match shape.len() {
            1 => Ok(data.to_vec()),
            2 if shape[0] == 1 => Ok(data.to_vec()),
            _ => Err(PipelineError::Inference {
                message: format!("Unexpected score tensor shape: {:?}", shape),
            }),
        }
    }
}

impl Classifier for OnnxClassifier {
    fn output_len(&self) -> Option<usize> {
        Some(self.output_len)
    }

    fn infer(&self, input: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        let start = std::time::Instant::now();
        let scores = self.run(input)?;
        tracing::debug!("Inference: {:?}", start.elapsed());
        Ok(scores)
    }
}
