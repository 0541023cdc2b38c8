//! The classification screen: one current image, one classify action.
//!
//! `Session` owns the image slot. Loading a new image replaces it wholesale;
//! a failed or cancelled load leaves it untouched. Classification reads the
//! slot and never modifies it.
//!
//! The classifier may be attached after the session is created, so images
//! can be picked before a (slow, possibly failing) model load.

use image::{DynamicImage, ImageFormat};

use crate::classifier::{Classifier, ImageClassifier};
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::{format_to_string, Hasher, ImageDecoder, Validator};
use crate::source::{ImageSource, SourceImage};
use crate::types::{ClassificationRecord, Prediction};

/// The decoded image currently on screen.
pub struct LoadedImage {
    /// Upright decoded pixels
    pub image: DynamicImage,
    /// Where it came from
    pub source_name: String,
    /// Detected encoding
    pub format: ImageFormat,
    /// Width after orientation
    pub width: u32,
    /// Height after orientation
    pub height: u32,
    /// BLAKE3 of the encoded bytes
    pub content_hash: String,
}

/// Screen controller holding the classifier and the current image.
pub struct Session<C> {
    classifier: Option<ImageClassifier<C>>,
    validator: Validator,
    decoder: ImageDecoder,
    current: Option<LoadedImage>,
}

impl<C: Classifier> Session<C> {
    /// Create a session with no image loaded.
    pub fn new(classifier: ImageClassifier<C>, config: &Config) -> Self {
        let mut session = Self::detached(config);
        session.classifier = Some(classifier);
        session
    }

    /// Create a session with neither an image nor a classifier.
    pub fn detached(config: &Config) -> Self {
        Self {
            classifier: None,
            validator: Validator::new(config.limits.clone()),
            decoder: ImageDecoder::new(config.limits.clone(), &config.preprocess),
            current: None,
        }
    }

    pub fn classifier(&self) -> Option<&ImageClassifier<C>> {
        self.classifier.as_ref()
    }

    /// Attach (or replace) the classifier. The current image is kept.
    pub fn attach(&mut self, classifier: ImageClassifier<C>) {
        self.classifier = Some(classifier);
    }

    /// The image currently loaded, if any.
    pub fn current(&self) -> Option<&LoadedImage> {
        self.current.as_ref()
    }

    /// Drop the current image.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Ask a source for an image and make it current.
    ///
    /// Returns `Ok(None)` if the source was cancelled; the previous image
    /// stays loaded in that case and on any error.
    pub fn acquire(&mut self, source: &dyn ImageSource) -> PipelineResult<Option<&LoadedImage>> {
        tracing::debug!("Acquiring image from {}", source.describe());
        match source.acquire()? {
            Some(image) => self.load(image).map(Some),
            None => {
                tracing::info!("No image from {} (cancelled)", source.describe());
                Ok(None)
            }
        }
    }

    /// Decode encoded bytes and make them current.
    pub fn load_bytes(&mut self, name: &str, bytes: Vec<u8>) -> PipelineResult<&LoadedImage> {
        self.load(SourceImage {
            name: name.to_string(),
            bytes,
        })
    }

    fn load(&mut self, source: SourceImage) -> PipelineResult<&LoadedImage> {
        let start = std::time::Instant::now();
        self.validator.validate_bytes(&source.name, &source.bytes)?;
        let decoded = self.decoder.decode(&source.bytes, &source.name)?;
        let content_hash = Hasher::content_hash_from_bytes(&source.bytes);

        tracing::debug!(
            "Loaded {} ({}x{}, {}, orientation {:?}) in {:?}",
            source.name,
            decoded.width,
            decoded.height,
            format_to_string(decoded.format),
            decoded.orientation,
            start.elapsed()
        );

        Ok(&*self.current.insert(LoadedImage {
            image: decoded.image,
            source_name: source.name,
            format: decoded.format,
            width: decoded.width,
            height: decoded.height,
            content_hash,
        }))
    }

    /// Classify the current image.
    ///
    /// A missing image is reported before a missing classifier.
    pub fn classify(&self) -> PipelineResult<Prediction> {
        let loaded = self.current.as_ref().ok_or(PipelineError::NoImageSelected)?;
        let classifier = self
            .classifier
            .as_ref()
            .ok_or(PipelineError::ClassifierNotLoaded)?;
        classifier.classify(&loaded.image)
    }

    /// Classify the current image and build an output record.
    pub fn classify_record(&self, include_scores: bool) -> PipelineResult<ClassificationRecord> {
        let prediction = self.classify()?;
        let loaded = self.current.as_ref().ok_or(PipelineError::NoImageSelected)?;
        Ok(ClassificationRecord {
            source: loaded.source_name.clone(),
            content_hash: loaded.content_hash.clone(),
            width: loaded.width,
            height: loaded.height,
            format: format_to_string(loaded.format),
            confidence_text: prediction.confidence_percent(),
            label: prediction.label,
            index: prediction.index,
            confidence: prediction.confidence,
            scores: include_scores.then_some(prediction.scores),
        })
    }

    /// The text shown on screen after pressing "classify".
    ///
    /// Errors are rendered as their message; nothing here is fatal.
    pub fn result_text(&self) -> String {
        match self.classify() {
            Ok(prediction) => prediction.to_string(),
            Err(e) => {
                if !e.is_user_facing() {
                    tracing::error!("Classification failed: {e}");
                }
                e.to_string()
            }
        }
    }
}
