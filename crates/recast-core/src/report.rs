//! Reporting: serializable outcome records, batch summaries and a JSON/JSONL
//! writer for them.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::time::Duration;

use crate::types::{ConversionOutcome, OutcomeKind, TargetFormat};

/// One line of a conversion report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub status: OutcomeKind,
    pub item_id: String,
    pub source_filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
    /// Where the artifact was written, when the caller saved it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OutcomeRecord {
    pub fn with_output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = Some(path.into());
        self
    }
}

impl From<&ConversionOutcome> for OutcomeRecord {
    fn from(outcome: &ConversionOutcome) -> Self {
        match outcome {
            ConversionOutcome::Success(s) => Self {
                status: OutcomeKind::Success,
                item_id: s.item_id.to_string(),
                source_filename: s.source_filename.clone(),
                output_filename: Some(s.output_filename.clone()),
                output_path: None,
                source_size: Some(s.source_size),
                output_size: Some(s.output_size),
                error_kind: None,
                message: None,
            },
            ConversionOutcome::Failure(f) => Self {
                status: OutcomeKind::Failure,
                item_id: f.item_id.to_string(),
                source_filename: f.source_filename.clone(),
                output_filename: None,
                output_path: None,
                source_size: None,
                output_size: None,
                error_kind: Some(f.error.kind().to_string()),
                message: Some(f.message()),
            },
        }
    }
}

/// Totals for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub target_format: TargetFormat,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Source bytes of the items that converted
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub elapsed_ms: u64,
}

impl BatchSummary {
    pub fn from_outcomes(
        target_format: TargetFormat,
        outcomes: &[ConversionOutcome],
        elapsed: Duration,
    ) -> Self {
        let mut summary = Self {
            target_format,
            total: outcomes.len(),
            succeeded: 0,
            failed: 0,
            bytes_in: 0,
            bytes_out: 0,
            elapsed_ms: elapsed.as_millis() as u64,
        };
        for outcome in outcomes {
            match outcome {
                ConversionOutcome::Success(s) => {
                    summary.succeeded += 1;
                    summary.bytes_in += s.source_size;
                    summary.bytes_out += s.output_size;
                }
                ConversionOutcome::Failure(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// Images converted per second over the whole run.
    pub fn rate(&self) -> f64 {
        if self.elapsed_ms == 0 {
            return 0.0;
        }
        self.succeeded as f64 / (self.elapsed_ms as f64 / 1000.0)
    }
}

/// A complete report: summary plus per-item records in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: BatchSummary,
    pub outcomes: Vec<OutcomeRecord>,
}

/// Report serialization formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// One JSON document
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl ReportFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Writes reports as JSON or JSONL to any [`Write`].
pub struct OutputWriter<W: Write> {
    writer: W,
    format: ReportFormat,
    pretty: bool,
    records_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects [`ReportFormat::Json`].
    pub fn new(writer: W, format: ReportFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            records_written: 0,
        }
    }

    /// Write a single serializable value followed by a newline.
    fn write_value<T: Serialize>(&mut self, value: &T, pretty: bool) -> io::Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut self.writer, value).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, value).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }

    /// Write a whole report.
    ///
    /// JSON emits a single `{ "summary", "outcomes" }` document. JSONL emits
    /// one record per line, then a final `{ "summary": ... }` line.
    pub fn write_report(&mut self, report: &Report) -> io::Result<()> {
        match self.format {
            ReportFormat::Json => {
                self.write_value(report, self.pretty)?;
                self.records_written += report.outcomes.len();
            }
            ReportFormat::JsonLines => {
                for record in &report.outcomes {
                    self.write_value(record, false)?;
                    self.records_written += 1;
                }
                self.write_value(&serde_json::json!({ "summary": report.summary }), false)?;
            }
        }
        self.writer.flush()
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Human-readable byte count in base 1024: `0 Bytes`, `500 Bytes`, `1.5 KB`.
///
/// Rounds to `decimals` places and drops trailing zeros.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    const UNITS: [&str; 7] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.*}", decimals, value);
    let trimmed = if rounded.contains('.') {
        rounded.trim_end_matches('0').trim_end_matches('.')
    } else {
        rounded.as_str()
    };
    format!("{} {}", trimmed, UNITS[unit])
}

/// Shorten a filename for display, keeping its extension visible.
///
/// `"a_very_long_holiday_photo.jpeg"` at 20 becomes `"a_very_long_....jpeg"`.
pub fn truncate_filename(name: &str, max_chars: usize) -> String {
    let len = name.chars().count();
    if len <= max_chars {
        return name.to_string();
    }

    let (base, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    };
    let keep = max_chars.saturating_sub(ext.chars().count() + 3);
    let head: String = base.chars().take(keep).collect();
    format!("{head}...{ext}")
}
