//! Error types for the Petal classification pipeline.
//!
//! Errors are organized by stage so that every message names the source
//! (file path, camera command, model file) and what went wrong with it.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Petal operations.
#[derive(Error, Debug)]
pub enum PetalError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Acquisition, decode or classification errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while acquiring, decoding or classifying an image.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Classification was requested before any image was loaded.
    #[error("No image selected!")]
    NoImageSelected,

    /// The source bytes could not be decoded into a bitmap
    #[error("Failed to decode {source_name}: {message}")]
    Decode {
        source_name: String,
        message: String,
    },

    /// Unsupported image format
    #[error("Unsupported format for {source_name}: {format}")]
    UnsupportedFormat { source_name: String, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Source exceeds the size limit
    #[error("File too large: {source_name} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        source_name: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed the limit
    #[error("Image too large: {source_name} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        source_name: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// The camera capture command could not be run
    #[error("Camera capture failed ({command}): {message}")]
    Capture { command: String, message: String },

    /// Classification was requested before a model was attached
    #[error("Classifier not loaded")]
    ClassifierNotLoaded,

    /// The model file could not be loaded
    #[error("Model error for {path}: {message}")]
    Model { path: PathBuf, message: String },

    /// The model rejected the input or produced an unusable output
    #[error("Inference failed: {message}")]
    Inference { message: String },

    /// Model output cardinality and label table length disagree
    #[error(
        "Label table has {labels} entries but the model produces {scores} scores; \
         check the labels file against the model"
    )]
    LabelMismatch { labels: usize, scores: usize },

    /// The score vector contained no comparable value
    #[error("Unknown: the model returned no usable scores")]
    NoScores,

    /// The label table could not be read or is empty
    #[error("Label table error for {path}: {message}")]
    Labels { path: PathBuf, message: String },
}

impl PipelineError {
    /// Whether this error is one the user can recover from by supplying a
    /// different image, as opposed to a setup problem.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            PipelineError::NoImageSelected
                | PipelineError::Decode { .. }
                | PipelineError::UnsupportedFormat { .. }
                | PipelineError::FileNotFound(_)
                | PipelineError::FileTooLarge { .. }
                | PipelineError::ImageTooLarge { .. }
        )
    }
}

/// Convenience type alias for Petal results.
pub type Result<T> = std::result::Result<T, PetalError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_image_message_is_exact() {
        assert_eq!(
            PipelineError::NoImageSelected.to_string(),
            "No image selected!"
        );
    }

    #[test]
    fn test_label_mismatch_names_both_lengths() {
        let err = PipelineError::LabelMismatch {
            labels: 10,
            scores: 11,
        };
        let msg = err.to_string();
        assert!(msg.contains("10 entries"));
        assert!(msg.contains("11 scores"));
    }

    #[test]
    fn test_user_facing_classification() {
        assert!(PipelineError::NoImageSelected.is_user_facing());
        assert!(PipelineError::Decode {
            source_name: "a.jpg".into(),
            message: "bad".into()
        }
        .is_user_facing());
        assert!(!PipelineError::LabelMismatch {
            labels: 1,
            scores: 2
        }
        .is_user_facing());
        assert!(!PipelineError::ClassifierNotLoaded.is_user_facing());
    }

    #[test]
    fn test_pipeline_error_wraps_into_petal_error() {
        let err: PetalError = PipelineError::NoScores.into();
        assert!(err.to_string().starts_with("Pipeline error:"));
    }
}
