//! Image sources: where a photo comes from before it is decoded.
//!
//! A source hands back the encoded bytes of one image, or `None` when the
//! user backed out (an empty pick, a cancelled capture). Cancelling is not an
//! error and must leave the currently loaded image untouched.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::config::{CaptureConfig, LimitsConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::Validator;

/// Encoded image bytes plus a name for messages and format fallback.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// File path, "stdin", "camera", ...
    pub name: String,
    /// Encoded image data
    pub bytes: Vec<u8>,
}

/// Something that can supply one image on request.
pub trait ImageSource {
    /// Short description for logs and prompts.
    fn describe(&self) -> String;

    /// Produce the image, or `Ok(None)` if the user cancelled.
    fn acquire(&self) -> PipelineResult<Option<SourceImage>>;
}

/// Picks an existing image file from disk.
pub struct GallerySource {
    path: PathBuf,
    validator: Validator,
}

impl GallerySource {
    pub fn new(path: impl Into<PathBuf>, limits: &LimitsConfig) -> Self {
        Self {
            path: path.into(),
            validator: Validator::new(limits.clone()),
        }
    }
}

impl ImageSource for GallerySource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn acquire(&self) -> PipelineResult<Option<SourceImage>> {
        // Size is checked before reading so oversized files never hit memory
        self.validator.validate_path(&self.path)?;

        let bytes = std::fs::read(&self.path).map_err(|e| PipelineError::Decode {
            source_name: self.describe(),
            message: format!("Cannot read file: {}", e),
        })?;

        Ok(Some(SourceImage {
            name: self.describe(),
            bytes,
        }))
    }
}

/// Captures a photo by running an external camera program.
///
/// The program must write a single encoded image to stdout. A non-zero exit
/// status or empty output is treated as the user cancelling the capture.
pub struct CameraSource {
    command: Vec<String>,
}

impl CameraSource {
    /// Build a camera source from config, or `None` if no command is set.
    pub fn from_config(config: &CaptureConfig) -> Option<Self> {
        config.is_configured().then(|| Self {
            command: config.command.clone(),
        })
    }

    fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

impl ImageSource for CameraSource {
    fn describe(&self) -> String {
        "camera".to_string()
    }

    fn acquire(&self) -> PipelineResult<Option<SourceImage>> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| PipelineError::Capture {
                command: String::new(),
                message: "No capture command configured".to_string(),
            })?;

        tracing::debug!("Running capture command: {}", self.command_line());
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| PipelineError::Capture {
                command: self.command_line(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                "Capture cancelled ({}): {}",
                output.status,
                stderr.trim()
            );
            return Ok(None);
        }
        if output.stdout.is_empty() {
            tracing::warn!("Capture produced no image data");
            return Ok(None);
        }

        Ok(Some(SourceImage {
            name: self.describe(),
            bytes: output.stdout,
        }))
    }
}

/// An image already held in memory (stdin, tests, embedding applications).
pub struct MemorySource {
    image: SourceImage,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            image: SourceImage {
                name: name.into(),
                bytes,
            },
        }
    }

    /// Read an entire stream, e.g. stdin.
    pub fn from_reader(name: impl Into<String>, mut reader: impl Read) -> std::io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::new(name, bytes))
    }
}

impl ImageSource for MemorySource {
    fn describe(&self) -> String {
        self.image.name.clone()
    }

    fn acquire(&self) -> PipelineResult<Option<SourceImage>> {
        if self.image.bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.image.clone()))
    }
}
