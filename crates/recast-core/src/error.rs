//! Error types for the Recast conversion pipeline.
//!
//! Per-item problems are [`ConversionError`]s and end up inside a
//! `ConversionOutcome::Failure`; they never abort a batch. Only
//! [`BatchError`] (precondition violations) and [`ConfigError`] stop a run.

use thiserror::Error;

use crate::types::TargetFormat;

/// Top-level error type for Recast operations.
#[derive(Error, Debug)]
pub enum RecastError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Batch precondition violations
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Conditions that reject a whole batch before any item is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// `run` was called with nothing to convert
    #[error("No images to convert")]
    EmptyBatch,

    /// The conversion request failed validation
    #[error("Invalid conversion request: {0}")]
    InvalidRequest(String),
}

/// Why a single item failed to convert.
///
/// The `Display` output is the user-facing message shown next to the item.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Target format has no encode capability
    #[error("Format {format} is not supported for conversion.")]
    UnsupportedFormat { format: TargetFormat },

    /// Raster source with a vector target
    #[error("Converting raster images to {format} (vectorization) is not supported.")]
    UnsupportedConversionKind { format: TargetFormat },

    /// Source bytes could not be interpreted as an image
    #[error("Failed to load image {filename}")]
    DecodeFailure { filename: String, reason: String },

    /// The codec declined to produce output bytes
    #[error("Could not encode output for {format}.")]
    EncodeFailure { format: TargetFormat, reason: String },

    /// A codec call exceeded its configured deadline
    #[error("Timed out during {stage} after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// The per-item task died before producing an outcome
    #[error("Conversion aborted: {reason}")]
    Aborted { reason: String },
}

impl ConversionError {
    /// Short machine-readable kind, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::UnsupportedConversionKind { .. } => "unsupported_conversion_kind",
            Self::DecodeFailure { .. } => "decode_failure",
            Self::EncodeFailure { .. } => "encode_failure",
            Self::Timeout { .. } => "timeout",
            Self::Aborted { .. } => "aborted",
        }
    }
}

/// Errors raised at the codec boundary.
///
/// The converter maps these onto [`ConversionError`] with the item's context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("encode failed: {0}")]
    Encode(String),

    #[error("{stage} timed out after {timeout_ms}ms")]
    Timeout { stage: &'static str, timeout_ms: u64 },

    #[error("codec task failed: {0}")]
    Join(String),
}

/// Convenience type alias for Recast results.
pub type Result<T> = std::result::Result<T, RecastError>;
