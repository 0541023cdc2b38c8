//! Sub-configuration structs with defaults for the bundled flower model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where models are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.petal/models"),
        }
    }
}

/// Memory layout of the model's input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[batch, height, width, channels]`, as exported from TFLite/Keras
    #[default]
    Nhwc,
    /// `[batch, channels, height, width]`, as exported from PyTorch
    Nchw,
}

/// How 8-bit channel values are mapped to floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Keep the 0..=255 range (the model rescales internally)
    #[default]
    Raw,
    /// Scale to 0..=1
    Unit,
    /// Scale to -1..=1 via `(v / 127.5) - 1`
    Symmetric,
}

impl Normalization {
    /// Map one 8-bit channel value into the model's float range.
    #[inline]
    pub fn apply(self, value: u8) -> f32 {
        let v = value as f32;
        match self {
            Normalization::Raw => v,
            Normalization::Unit => v / 255.0,
            Normalization::Symmetric => v / 127.5 - 1.0,
        }
    }

    /// Inclusive output range for this normalization.
    pub fn range(self) -> (f32, f32) {
        match self {
            Normalization::Raw => (0.0, 255.0),
            Normalization::Unit => (0.0, 1.0),
            Normalization::Symmetric => (-1.0, 1.0),
        }
    }
}

/// Resampling filter used when scaling to the model's input size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    /// Bilinear
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<ResizeFilter> for image::imageops::FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => image::imageops::FilterType::Nearest,
            ResizeFilter::Triangle => image::imageops::FilterType::Triangle,
            ResizeFilter::CatmullRom => image::imageops::FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Classifier model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model filename inside `general.model_dir`, or an absolute path
    pub file: String,

    /// Square input edge in pixels
    pub input_size: u32,

    /// Input tensor layout
    pub layout: TensorLayout,

    /// Pixel value mapping
    pub normalization: Normalization,

    /// Resampling filter for the resize step
    pub resize_filter: ResizeFilter,

    /// Expected BLAKE3 checksum of the model file (empty disables the check)
    pub blake3: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            file: "flower_classifier.onnx".to_string(),
            input_size: 224,
            layout: TensorLayout::Nhwc,
            normalization: Normalization::Raw,
            resize_filter: ResizeFilter::Triangle,
            blake3: String::new(),
        }
    }
}

/// Label table settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    /// Path to a labels file, one class per line. Empty uses the bundled table.
    pub file: String,
}

/// Camera capture settings.
///
/// The command is run without a shell and must write one encoded image to
/// stdout, e.g. `["libcamera-still", "-n", "-o", "-"]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Program and arguments
    pub command: Vec<String>,
}

impl CaptureConfig {
    /// Whether a capture command has been configured.
    pub fn is_configured(&self) -> bool {
        !self.command.is_empty()
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum source size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            max_image_dimension: 16384,
        }
    }
}

/// Preprocessing settings applied at decode time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Rotate/flip according to the EXIF orientation tag
    pub apply_orientation: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            apply_orientation: true,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("text", "json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,

    /// Include the full per-class score list in JSON output
    pub include_scores: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            pretty: false,
            include_scores: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
