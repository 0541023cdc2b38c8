//! Petal Core - embeddable flower photo classification.
//!
//! Petal takes one photo at a time, runs it through a pre-trained image
//! classifier and reports the most likely flower class with its confidence.
//!
//! # Architecture
//!
//! ```text
//! Source (file / stdin / camera) → Validate → Decode → Resize 224² → Model → Arg-max → Label
//! ```
//!
//! The model itself is opaque: anything implementing [`Classifier`] can sit in
//! the middle. [`OnnxClassifier`] runs an ONNX export through ONNX Runtime.
//!
//! # Usage
//!
//! ```rust,ignore
//! use petal_core::{Config, GallerySource, Petal};
//!
//! fn main() -> petal_core::Result<()> {
//!     let config = Config::load()?;
//!     let petal = Petal::new(config);
//!     let mut session = petal.open_session()?;
//!
//!     session.acquire(&GallerySource::new("rose.jpg", &petal.config().limits))?;
//!     println!("{}", session.result_text());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod classifier;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod session;
pub mod source;
pub mod types;

// Re-exports for convenient access
pub use classifier::{Classifier, ImageClassifier, LabelTable, OnnxClassifier, Preprocessor};
pub use config::Config;
pub use error::{ConfigError, PetalError, PipelineError, PipelineResult, Result};
pub use output::{OutputFormat, OutputWriter};
pub use session::{LoadedImage, Session};
pub use source::{CameraSource, GallerySource, ImageSource, MemorySource, SourceImage};
pub use types::{ClassificationRecord, LabelScore, Prediction};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Petal entry point: turns a [`Config`] into a ready classifier or session.
pub struct Petal {
    config: Config,
}

impl Petal {
    /// Create a new Petal instance with the given configuration.
    pub fn new(config: Config) -> Self {
        tracing::debug!("Initializing Petal v{}", VERSION);
        Self { config }
    }

    /// Create a new Petal instance from the config file (or defaults).
    pub fn with_defaults() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self::new(config))
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the resolved model file path.
    pub fn model_path(&self) -> std::path::PathBuf {
        self.config.model_path()
    }

    /// Load the configured label table (or the bundled one).
    pub fn load_labels(&self) -> PipelineResult<LabelTable> {
        LabelTable::load_or_bundled(self.config.labels_path().as_deref())
    }

    /// Load the ONNX model and pair it with the label table.
    ///
    /// Fails if the model's output length differs from the label count.
    pub fn load_classifier(&self) -> PipelineResult<ImageClassifier<OnnxClassifier>> {
        let labels = self.load_labels()?;
        let preprocessor = Preprocessor::new(&self.config.model);
        let model_path = self.model_path();
        tracing::info!("Loading classifier from {:?}", model_path);
        let model = OnnxClassifier::load(&model_path, &preprocessor.zeros())?;
        ImageClassifier::new(model, labels, preprocessor)
    }

    /// Open a classification session backed by the configured model.
    pub fn open_session(&self) -> Result<Session<OnnxClassifier>> {
        let classifier = self.load_classifier()?;
        Ok(Session::new(classifier, &self.config))
    }

    /// Open a session around a caller-supplied classifier.
    pub fn session_with<C: Classifier>(&self, model: C) -> Result<Session<C>> {
        let labels = self.load_labels()?;
        let classifier =
            ImageClassifier::new(model, labels, Preprocessor::new(&self.config.model))?;
        Ok(Session::new(classifier, &self.config))
    }
}
