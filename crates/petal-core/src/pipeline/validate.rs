//! Input validation before decoding.

use std::path::Path;

use image::ImageFormat;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Validates sources before the (comparatively expensive) decode.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check that a file exists and is within the size limit, without reading it.
    pub fn validate_path(&self, path: &Path) -> Result<(), PipelineError> {
        if !path.is_file() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Decode {
            source_name: path.display().to_string(),
            message: format!("Cannot read metadata: {}", e),
        })?;

        self.check_size(&path.display().to_string(), metadata.len())
    }

    /// Check an in-memory source: size limit and a recognizable format.
    ///
    /// The format is sniffed from the content the same way the decoder does,
    /// falling back to the extension in `source_name` for formats without a
    /// signature (TGA).
    pub fn validate_bytes(&self, source_name: &str, bytes: &[u8]) -> Result<(), PipelineError> {
        self.check_size(source_name, bytes.len() as u64)?;

        if bytes.len() < 4 {
            return Err(PipelineError::Decode {
                source_name: source_name.to_string(),
                message: "Data too small to be a valid image".to_string(),
            });
        }

        if Self::recognized_format(source_name, bytes).is_none() {
            return Err(PipelineError::Decode {
                source_name: source_name.to_string(),
                message: "Unrecognized image format".to_string(),
            });
        }

        Ok(())
    }

    fn check_size(&self, source_name: &str, len: u64) -> Result<(), PipelineError> {
        let max_bytes = self.limits.max_file_size_mb.saturating_mul(BYTES_PER_MB);
        if len > max_bytes {
            return Err(PipelineError::FileTooLarge {
                source_name: source_name.to_string(),
                size_mb: len / BYTES_PER_MB,
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(())
    }

    fn recognized_format(source_name: &str, bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes)
            .or_else(|_| ImageFormat::from_path(Path::new(source_name)))
            .ok()
    }
}
