//! Configuration management for Petal.
//!
//! Configuration is loaded from the platform config directory with defaults
//! that match the bundled 11-class flower model.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Petal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Classifier model settings
    pub model: ModelConfig,

    /// Label table settings
    pub labels: LabelsConfig,

    /// Camera capture settings
    pub capture: CaptureConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Decode-time preprocessing
    pub preprocess: PreprocessConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.petal.petal/config.toml
    /// - Linux: ~/.config/petal/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\petal\config\config.toml
    ///
    /// Falls back to ~/.petal/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "petal", "petal")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".petal").join("config.toml")
            })
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        expand(&self.general.model_dir.to_string_lossy())
    }

    /// Get the resolved model file path.
    ///
    /// An absolute (or `~`-prefixed) `model.file` is used as-is; a bare name
    /// is looked up inside the model directory.
    pub fn model_path(&self) -> PathBuf {
        let file = expand(&self.model.file);
        if file.is_absolute() {
            file
        } else {
            self.model_dir().join(file)
        }
    }

    /// Get the labels file path, or `None` when the bundled table is used.
    pub fn labels_path(&self) -> Option<PathBuf> {
        if self.labels.file.trim().is_empty() {
            None
        } else {
            Some(expand(&self.labels.file))
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.input_size, 224);
        assert_eq!(config.model.layout, TensorLayout::Nhwc);
        assert_eq!(config.output.format, "text");
        assert!(config.labels_path().is_none());
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[model]"));
        assert!(toml.contains("normalization = \"raw\""));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [model]
            normalization = "unit"

            [labels]
            file = "/etc/petal/labels.txt"
            "#,
        )
        .unwrap();
        assert_eq!(config.model.normalization, Normalization::Unit);
        assert_eq!(config.model.input_size, 224);
        assert_eq!(
            config.labels_path(),
            Some(PathBuf::from("/etc/petal/labels.txt"))
        );
        assert_eq!(config.limits.max_file_size_mb, 50);
    }

    #[test]
    fn test_model_path_relative_and_absolute() {
        let mut config = Config::default();
        config.general.model_dir = PathBuf::from("/opt/models");
        assert_eq!(
            config.model_path(),
            PathBuf::from("/opt/models/flower_classifier.onnx")
        );

        config.model.file = "/srv/other.onnx".to_string();
        assert_eq!(config.model_path(), PathBuf::from("/srv/other.onnx"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[limits]\nmax_file_size_mb = 8\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.limits.max_file_size_mb, 8);
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model]\ninput_size = 0\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("input_size"));
    }
}
