//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.model.file.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model.file must not be empty".into(),
            ));
        }
        if self.model.input_size == 0 {
            return Err(ConfigError::ValidationError(
                "model.input_size must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be one of text, json, jsonl (got {:?})",
                self.output.format
            )));
        }
        if self.capture.is_configured() && self.capture.command[0].trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "capture.command must start with a program name".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_input_size() {
        let mut config = Config::default();
        config.model.input_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("input_size"));
    }

    #[test]
    fn test_validate_rejects_empty_model_file() {
        let mut config = Config::default();
        config.model.file = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("model.file"));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = Config::default();
        config.limits.max_file_size_mb = 0;
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("max_file_size_mb"));

        let mut config = Config::default();
        config.limits.max_image_dimension = 0;
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("max_image_dimension"));
    }

    #[test]
    fn test_validate_rejects_unknown_output_format() {
        let mut config = Config::default();
        config.output.format = "xml".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.format"));
    }

    #[test]
    fn test_validate_rejects_blank_capture_program() {
        let mut config = Config::default();
        config.capture.command = vec!["".to_string(), "-o".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("capture.command"));
    }
}
