//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let quality = self.conversion.default_quality;
        if !(0.0..=1.0).contains(&quality) {
            return Err(ConfigError::ValidationError(
                "conversion.default_quality must be between 0.0 and 1.0".into(),
            ));
        }
        if self.batch.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "batch.parallel_workers must be > 0".into(),
            ));
        }
        if self.batch.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "batch.buffer_size must be > 0".into(),
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
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.encode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.encode_timeout_ms must be > 0".into(),
            ));
        }
        if self.input.supported_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "input.supported_extensions must not be empty".into(),
            ));
        }
        if !matches!(self.output.format.as_str(), "json" | "jsonl") {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be \"json\" or \"jsonl\", got \"{}\"",
                self.output.format
            )));
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
    fn test_validate_rejects_zero_parallel_workers() {
        let mut config = Config::default();
        config.batch.parallel_workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("parallel_workers"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.encode_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("encode_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_quality() {
        let mut config = Config::default();
        config.conversion.default_quality = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_quality"));

        config.conversion.default_quality = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_report_format() {
        let mut config = Config::default();
        config.output.format = "xml".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.format"));
    }

    #[test]
    fn test_validate_rejects_empty_extension_list() {
        let mut config = Config::default();
        config.input.supported_extensions.clear();
        assert!(config.validate().is_err());
    }
}
