//! Image preprocessing for the flower classifier.
//!
//! The bundled model expects:
//! - Input size: 224×224 pixels, scaled (not cropped) from the source
//! - Channel order: RGB
//! - Tensor layout: NHWC `[1, 224, 224, 3]`
//! - Values: raw 0..=255 floats (the model rescales internally)
//!
//! Size, layout, normalization and filter all come from `ModelConfig` so that
//! a retrained or re-exported model can be dropped in.

use image::DynamicImage;
use ndarray::Array4;

use crate::config::{ModelConfig, Normalization, ResizeFilter, TensorLayout};

/// Number of color channels (RGB).
pub const CHANNELS: usize = 3;

/// Converts decoded images into the model's input tensor.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    size: u32,
    layout: TensorLayout,
    normalization: Normalization,
    filter: ResizeFilter,
}

impl Preprocessor {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            size: config.input_size,
            layout: config.layout,
            normalization: config.normalization,
            filter: config.resize_filter,
        }
    }

    /// Square input edge in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn layout(&self) -> TensorLayout {
        self.layout
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Shape of the tensor produced by [`Preprocessor::preprocess`].
    pub fn shape(&self) -> [usize; 4] {
        let s = self.size as usize;
        match self.layout {
            TensorLayout::Nhwc => [1, s, s, CHANNELS],
            TensorLayout::Nchw => [1, CHANNELS, s, s],
        }
    }

    /// A tensor of the input shape filled with zeros.
    pub fn zeros(&self) -> Array4<f32> {
        Array4::<f32>::zeros(self.shape())
    }

    /// Resize to `size × size`, convert to RGB, normalize, and lay out as a
    /// batch-of-one tensor.
    pub fn preprocess(&self, image: &DynamicImage) -> Array4<f32> {
        let resized = image.resize_exact(self.size, self.size, self.filter.into());
        let rgb = resized.to_rgb8();

        let size = self.size as usize;
        let mut tensor = self.zeros();
        let norm = self.normalization;

        match self.layout {
            TensorLayout::Nhwc => {
                // NHWC matches the interleaved RGB buffer byte for byte.
                for (dst, &val) in tensor.iter_mut().zip(rgb.as_raw().iter()) {
                    *dst = norm.apply(val);
                }
            }
            TensorLayout::Nchw => {
                let plane = size * size;
                if let Some(data) = tensor.as_slice_mut() {
                    for (i, pixel) in rgb.as_raw().chunks_exact(CHANNELS).enumerate() {
                        for (c, &val) in pixel.iter().enumerate() {
                            data[c * plane + i] = norm.apply(val);
                        }
                    }
                }
            }
        }

        tensor
    }
}
