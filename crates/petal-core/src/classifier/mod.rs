//! Flower classification around an opaque pre-trained model.
//!
//! The pipeline is fixed: resize to the model's square input, lay out as a
//! float tensor, run the model, take the arg-max of the score vector and look
//! it up in the label table.
//!
//! # Usage
//!
//! ```rust,ignore
//! use petal_core::classifier::{ImageClassifier, LabelTable, OnnxClassifier, Preprocessor};
//!
//! let preprocessor = Preprocessor::new(&config.model);
//! let model = OnnxClassifier::load(&config.model_path(), &preprocessor.zeros())?;
//! let classifier = ImageClassifier::new(model, LabelTable::bundled(), preprocessor)?;
//! let prediction = classifier.classify(&image)?;
//! println!("{prediction}");
//! ```

pub mod labels;
pub mod onnx;
pub mod postprocess;
pub mod preprocess;

use image::DynamicImage;
use ndarray::Array4;

use crate::error::PipelineError;
use crate::types::{LabelScore, Prediction};

pub use labels::LabelTable;
pub use onnx::OnnxClassifier;
pub use postprocess::{argmax, format_confidence};
pub use preprocess::Preprocessor;

/// A model that maps an input tensor to one score per class.
///
/// This is the seam between Petal and the inference runtime; tests and
/// embedders can supply their own implementation.
pub trait Classifier: Send + Sync {
    /// Length of the score vector, if known before the first call.
    fn output_len(&self) -> Option<usize>;

    /// Run one forward pass.
    fn infer(&self, input: &Array4<f32>) -> Result<Vec<f32>, PipelineError>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn output_len(&self) -> Option<usize> {
        (**self).output_len()
    }

    fn infer(&self, input: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        (**self).infer(input)
    }
}

/// Preprocessing, model and label table bundled into one classification call.
pub struct ImageClassifier<C> {
    model: C,
    labels: LabelTable,
    preprocessor: Preprocessor,
}

impl<C: Classifier> ImageClassifier<C> {
    /// Assemble a classifier, rejecting a label table whose length differs
    /// from the model's known output length.
    pub fn new(
        model: C,
        labels: LabelTable,
        preprocessor: Preprocessor,
    ) -> Result<Self, PipelineError> {
        if let Some(n) = model.output_len() {
            labels.ensure_matches(n)?;
        }
        Ok(Self {
            model,
            labels,
            preprocessor,
        })
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn model(&self) -> &C {
        &self.model
    }

    /// Classify a decoded image.
    pub fn classify(&self, image: &DynamicImage) -> Result<Prediction, PipelineError> {
        let start = std::time::Instant::now();
        let tensor = self.preprocessor.preprocess(image);
        tracing::trace!("  Preprocess: {:?}", start.elapsed());

        let scores = self.model.infer(&tensor)?;
        self.predict(&scores)
    }

    /// Turn a raw score vector into a prediction.
    pub fn predict(&self, scores: &[f32]) -> Result<Prediction, PipelineError> {
        // Checked on every call: a model with a dynamic output may disagree
        // with its probe, and a wrong label must never be reported.
        self.labels.ensure_matches(scores.len())?;

        let index = argmax(scores).ok_or(PipelineError::NoScores)?;
        let label = self
            .labels
            .get(index)
            .ok_or(PipelineError::LabelMismatch {
                labels: self.labels.len(),
                scores: scores.len(),
            })?
            .to_string();

        let scores: Vec<LabelScore> = self
            .labels
            .iter()
            .zip(scores)
            .map(|(label, &score)| LabelScore {
                label: label.to_string(),
                score,
            })
            .collect();

        let prediction = Prediction {
            index,
            label,
            confidence: scores[index].score,
            scores,
        };
        tracing::debug!(
            "Predicted {} ({}) at index {}",
            prediction.label,
            prediction.confidence_percent(),
            prediction.index
        );
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;

    /// Returns the same scores for any input.
    struct FixedScores {
        scores: Vec<f32>,
        declared_len: Option<usize>,
    }

    impl Classifier for FixedScores {
        fn output_len(&self) -> Option<usize> {
            self.declared_len
        }

        fn infer(&self, input: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
            assert_eq!(input.shape(), &[1, 224, 224, 3]);
            Ok(self.scores.clone())
        }
    }

    fn classifier(scores: Vec<f32>, declared_len: Option<usize>) -> ImageClassifier<FixedScores> {
        ImageClassifier::new(
            FixedScores {
                scores,
                declared_len,
            },
            LabelTable::bundled(),
            Preprocessor::new(&ModelConfig::default()),
        )
        .unwrap()
    }

    fn bougainvillea_scores() -> Vec<f32> {
        let mut scores = vec![0.0; 11];
        scores[0] = 0.1;
        scores[1] = 0.9;
        scores
    }

    #[test]
    fn test_classify_reports_bougainvillea() {
        let classifier = classifier(bougainvillea_scores(), Some(11));
        let prediction = classifier
            .classify(&DynamicImage::new_rgb8(320, 240))
            .unwrap();
        assert_eq!(prediction.index, 1);
        assert_eq!(
            prediction.to_string(),
            "Prediction: bougainvillea\nConfidence: 90.00%"
        );
        assert_eq!(prediction.scores.len(), 11);
    }

    #[test]
    fn test_declared_length_mismatch_rejected_at_construction() {
        let result = ImageClassifier::new(
            FixedScores {
                scores: vec![1.0; 5],
                declared_len: Some(5),
            },
            LabelTable::bundled(),
            Preprocessor::new(&ModelConfig::default()),
        );
        assert!(matches!(
            result.err().unwrap(),
            PipelineError::LabelMismatch {
                labels: 11,
                scores: 5
            }
        ));
    }

    #[test]
    fn test_runtime_length_mismatch_rejected() {
        // Model with unknown output length that returns 12 scores.
        let classifier = classifier(vec![0.5; 12], None);
        let err = classifier
            .classify(&DynamicImage::new_rgb8(8, 8))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::LabelMismatch {
                labels: 11,
                scores: 12
            }
        ));
    }

    #[test]
    fn test_all_nan_scores() {
        let classifier = classifier(vec![f32::NAN; 11], Some(11));
        let err = classifier.predict(&[f32::NAN; 11]).unwrap_err();
        assert!(matches!(err, PipelineError::NoScores));
    }

    #[test]
    fn test_tie_reports_lower_index() {
        let mut scores = vec![0.0; 11];
        scores[4] = 0.5;
        scores[7] = 0.5;
        let prediction = classifier(scores.clone(), Some(11))
            .predict(&scores)
            .unwrap();
        assert_eq!(prediction.index, 4);
        assert_eq!(prediction.label, "gardenias");
    }

    #[test]
    fn test_boxed_classifier_delegates() {
        let boxed: Box<dyn Classifier> = Box::new(FixedScores {
            scores: bougainvillea_scores(),
            declared_len: Some(11),
        });
        let classifier = ImageClassifier::new(
            boxed,
            LabelTable::bundled(),
            Preprocessor::new(&ModelConfig::default()),
        )
        .unwrap();
        assert_eq!(classifier.model().output_len(), Some(11));
    }
}
