//! CLI enum types for the convert command.

use clap::ValueEnum;
use recast_core::ReportFormat as CoreReportFormat;

/// Report file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Single JSON document
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl From<ReportFormat> for CoreReportFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => CoreReportFormat::Json,
            ReportFormat::Jsonl => CoreReportFormat::JsonLines,
        }
    }
}
