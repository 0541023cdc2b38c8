//! Image decoding with format detection, dimension limits and orientation.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::config::{LimitsConfig, PreprocessConfig};
use crate::error::PipelineError;

use super::orientation;

/// Image decoder with configurable limits.
pub struct ImageDecoder {
    limits: LimitsConfig,
    apply_orientation: bool,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded (and upright) image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// EXIF orientation that was applied, if any
    pub orientation: Option<u32>,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig, preprocess: &PreprocessConfig) -> Self {
        Self {
            limits,
            apply_orientation: preprocess.apply_orientation,
        }
    }

    /// Decode an encoded image held in memory.
    ///
    /// `source_name` is used for error messages and, when content sniffing
    /// fails, for extension-based format detection.
    pub fn decode(&self, bytes: &[u8], source_name: &str) -> Result<DecodedImage, PipelineError> {
        let mut reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                source_name: source_name.to_string(),
                message: format!("Cannot detect image format: {}", e),
            })?;

        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(Path::new(source_name)).map_err(|_| {
                PipelineError::UnsupportedFormat {
                    source_name: source_name.to_string(),
                    format: Path::new(source_name)
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("unknown")
                        .to_string(),
                }
            })?,
        };

        reader.set_format(format);
        let mut image = reader.decode().map_err(|e| PipelineError::Decode {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        if width > self.limits.max_image_dimension || height > self.limits.max_image_dimension {
            return Err(PipelineError::ImageTooLarge {
                source_name: source_name.to_string(),
                width,
                height,
                max_dim: self.limits.max_image_dimension,
            });
        }
        if width == 0 || height == 0 {
            return Err(PipelineError::Decode {
                source_name: source_name.to_string(),
                message: "Image has no pixels".to_string(),
            });
        }

        let orientation = if self.apply_orientation {
            orientation::read_orientation(bytes).filter(|&o| o != 1)
        } else {
            None
        };
        if let Some(o) = orientation {
            tracing::debug!("Applying EXIF orientation {} to {}", o, source_name);
            image = orientation::apply_orientation(image, o);
        }

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
            orientation,
        })
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        other => other
            .extensions_str()
            .first()
            .map_or_else(|| "unknown".to_string(), |ext| ext.to_string()),
    }
}
