//! Core data types produced by classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classifier::format_confidence;

/// Score assigned to one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    /// Class name from the label table
    pub label: String,

    /// Raw model score for this class
    pub score: f32,
}

impl LabelScore {
    /// Scores ordered best first. Ties keep model order; NaN scores go last.
    pub fn ranked(scores: &[LabelScore]) -> Vec<&LabelScore> {
        let mut ranked: Vec<&LabelScore> = scores.iter().collect();
        ranked.sort_by(|a, b| match (a.score.is_nan(), b.score.is_nan()) {
            (false, false) => b.score.total_cmp(&a.score),
            (a_nan, b_nan) => a_nan.cmp(&b_nan),
        });
        ranked
    }
}

/// The outcome of one classification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Index of the winning class in the model output
    pub index: usize,

    /// Label of the winning class
    pub label: String,

    /// Raw score of the winning class
    pub confidence: f32,

    /// Every class score, in model output order
    pub scores: Vec<LabelScore>,
}

impl Prediction {
    /// Confidence as a two-decimal percentage, e.g. `"82.31%"`.
    pub fn confidence_percent(&self) -> String {
        format_confidence(self.confidence)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Prediction: {}\nConfidence: {}",
            self.label,
            self.confidence_percent()
        )
    }
}

/// Serializable record of a classified image, used for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// Where the image came from (file path, "stdin", "camera")
    pub source: String,

    /// BLAKE3 hash of the encoded source bytes
    pub content_hash: String,

    /// Decoded width in pixels (after orientation)
    pub width: u32,

    /// Decoded height in pixels (after orientation)
    pub height: u32,

    /// Detected format ("jpeg", "png", ...)
    pub format: String,

    /// Winning label
    pub label: String,

    /// Winning class index
    pub index: usize,

    /// Raw score of the winning class
    pub confidence: f32,

    /// Percentage rendering of `confidence`
    pub confidence_text: String,

    /// Full score list (only when requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<LabelScore>>,
}

impl fmt::Display for ClassificationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Prediction: {}\nConfidence: {}",
            self.label, self.confidence_text
        )
    }
}
