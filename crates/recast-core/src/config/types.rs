//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Defaults applied to a conversion request when the caller leaves them out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Quality used for lossy targets when none is given (0.0 to 1.0)
    pub default_quality: f32,

    /// Derive the missing axis from the source aspect ratio
    pub keep_aspect_ratio: bool,

    /// Where the CLI writes converted files
    pub output_dir: PathBuf,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            default_quality: 0.9,
            keep_aspect_ratio: true,
            output_dir: PathBuf::from("./converted"),
        }
    }
}

/// Batch concurrency settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Max items inside the codec at once
    pub parallel_workers: usize,

    /// Max finished outcomes buffered before the collector drains them
    pub buffer_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
            buffer_size: 100,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Probe and decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Resize and encode timeout in milliseconds
    pub encode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            encode_timeout_ms: 10000,
        }
    }
}

impl LimitsConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Input discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// File extensions picked up when walking directories
    pub supported_extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            supported_extensions: [
                "jpg", "jpeg", "png", "webp", "gif", "bmp", "svg", "tif", "tiff", "avif",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default report format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
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
