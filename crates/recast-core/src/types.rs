//! Core data types for the Recast conversion pipeline.
//!
//! These types describe what goes into a batch (pending items plus one shared
//! request) and what comes out of it (one outcome per item plus progress).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::ConversionError;
use crate::pipeline::capability::capability;

/// Output format identifier requested by the caller.
///
/// Any identifier can be represented; ones the pipeline does not know become
/// `Unknown` and fail at conversion time with an "unsupported" message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetFormat {
    Jpg,
    Png,
    Webp,
    Gif,
    Bmp,
    Svg,
    Tiff,
    Avif,
    Unknown(String),
}

impl TargetFormat {
    /// Parse an identifier case-insensitively (`jpeg` → `Jpg`, `tif` → `Tiff`).
    pub fn parse(identifier: &str) -> Self {
        let id = identifier.trim().to_lowercase();
        match id.as_str() {
            "jpg" | "jpeg" => Self::Jpg,
            "png" => Self::Png,
            "webp" => Self::Webp,
            "gif" => Self::Gif,
            "bmp" => Self::Bmp,
            "svg" => Self::Svg,
            "tif" | "tiff" => Self::Tiff,
            "avif" => Self::Avif,
            _ => Self::Unknown(id),
        }
    }

    /// Lowercase identifier, also used as the output file extension.
    pub fn extension(&self) -> &str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Svg => "svg",
            Self::Tiff => "tiff",
            Self::Avif => "avif",
            Self::Unknown(id) => id,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension().to_uppercase())
    }
}

impl From<String> for TargetFormat {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<TargetFormat> for String {
    fn from(format: TargetFormat) -> Self {
        format.extension().to_string()
    }
}

/// Opaque identifier of a pending item, unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file-{}", self.0)
    }
}

/// A raw input handed over by whatever collects files (CLI, UI, ...).
#[derive(Debug, Clone)]
pub struct RawInput {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

/// One image awaiting conversion.
///
/// Created by ingestion once the natural dimensions are known; immutable
/// afterwards. The bytes are reference-counted so per-item tasks can share
/// them without copying.
#[derive(Debug, Clone)]
pub struct PendingItem {
    pub id: ItemId,
    pub source_bytes: Arc<[u8]>,
    pub source_filename: String,
    pub mime_type: String,
    pub original_width: u32,
    pub original_height: u32,
}

impl PendingItem {
    /// Size of the source in bytes.
    pub fn source_size(&self) -> u64 {
        self.source_bytes.len() as u64
    }
}

/// Parameters shared by every item of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub target_format: TargetFormat,
    /// Encoder quality in `[0, 1]`; required when the target uses quality.
    pub quality: Option<f32>,
    pub target_width: Option<u32>,
    pub target_height: Option<u32>,
    pub keep_aspect_ratio: bool,
}

impl ConversionRequest {
    /// Request converting to `target_format` with no quality and no resize.
    pub fn new(target_format: TargetFormat) -> Self {
        Self {
            target_format,
            quality: None,
            target_width: None,
            target_height: None,
            keep_aspect_ratio: true,
        }
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.target_width = width;
        self.target_height = height;
        self
    }

    pub fn with_keep_aspect_ratio(mut self, keep: bool) -> Self {
        self.keep_aspect_ratio = keep;
        self
    }

    /// Check the request's own invariants.
    ///
    /// Unsupported formats are *not* rejected here: they are reported per item.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(q) = self.quality {
            if !(0.0..=1.0).contains(&q) {
                return Err(format!("quality must be between 0.0 and 1.0, got {q}"));
            }
        }
        if capability(&self.target_format).uses_quality && self.quality.is_none() {
            return Err(format!("quality is required for {}", self.target_format));
        }
        if self.target_width == Some(0) {
            return Err("target width must be > 0".into());
        }
        if self.target_height == Some(0) {
            return Err("target height must be > 0".into());
        }
        Ok(())
    }

    /// [`validate`](Self::validate), then bound each explicit target axis by
    /// `max_dimension`.
    pub fn validate_within(&self, max_dimension: u32) -> Result<(), String> {
        self.validate()?;
        let axes = [("width", self.target_width), ("height", self.target_height)];
        for (axis, target) in axes {
            if let Some(value) = target.filter(|v| *v > max_dimension) {
                return Err(format!("target {axis} {value} exceeds the {max_dimension}px limit"));
            }
        }
        Ok(())
    }
}

/// A successfully converted artifact.
#[derive(Debug, Clone)]
pub struct ConvertedImage {
    pub item_id: ItemId,
    pub source_filename: String,
    pub output_filename: String,
    pub output_bytes: Vec<u8>,
    pub source_size: u64,
    pub output_size: u64,
}

/// A failed conversion with its structured cause.
#[derive(Debug, Clone)]
pub struct ConversionFailure {
    pub item_id: ItemId,
    pub source_filename: String,
    pub error: ConversionError,
}

impl ConversionFailure {
    /// Human-readable reason.
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// Terminal result of converting one pending item.
#[derive(Debug, Clone)]
pub enum ConversionOutcome {
    Success(ConvertedImage),
    Failure(ConversionFailure),
}

impl ConversionOutcome {
    pub fn item_id(&self) -> ItemId {
        match self {
            Self::Success(s) => s.item_id,
            Self::Failure(f) => f.item_id,
        }
    }

    pub fn source_filename(&self) -> &str {
        match self {
            Self::Success(s) => &s.source_filename,
            Self::Failure(f) => &f.source_filename,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success(_) => OutcomeKind::Success,
            Self::Failure(_) => OutcomeKind::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Failure,
}

/// Aggregate progress of a batch run, recomputed after every completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Kind of the completion that produced this snapshot
    pub last_event: Option<OutcomeKind>,
}

impl BatchProgress {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
            succeeded: 0,
            failed: 0,
            last_event: None,
        }
    }

    /// Account for one more settled item.
    pub fn record(&mut self, kind: OutcomeKind) {
        self.completed += 1;
        match kind {
            OutcomeKind::Success => self.succeeded += 1,
            OutcomeKind::Failure => self.failed += 1,
        }
        self.last_event = Some(kind);
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }

    /// Completion percentage, rounded to the nearest integer.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u32
    }
}
