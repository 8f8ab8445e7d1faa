//! Recast Core - embeddable batch image-format conversion.
//!
//! Takes a set of pending images plus one shared request (target format,
//! optional quality and resize) and produces, per image, either converted
//! bytes or a structured failure, reporting progress as items settle.
//!
//! # Architecture
//!
//! ```text
//! RawInput → Ingest (sniff, measure) → PendingItem → BatchRunner
//!          → Converter (capability, decode, resize, encode) → ConversionOutcome
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use recast_core::{Config, ConversionRequest, ConversionSession, TargetFormat};
//!
//! #[tokio::main]
//! async fn main() -> recast_core::Result<()> {
//!     let config = Config::load()?;
//!     let mut session = ConversionSession::new(&config);
//!     session.add(inputs).await;
//!
//!     let request = ConversionRequest::new(TargetFormat::Webp).with_quality(0.8);
//!     let outcomes = session.convert(request, |progress, _| {
//!         println!("{}%", progress.percent());
//!     }).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod types;

#[cfg(test)]
mod test_helpers;

// Re-exports for convenient access
pub use config::Config;
pub use error::{BatchError, CodecError, ConfigError, ConversionError, RecastError, Result};
pub use report::{format_bytes, BatchSummary, OutcomeRecord, OutputWriter, Report, ReportFormat};
pub use pipeline::{DiscoveredFile, FileDiscovery};
pub use session::ConversionSession;
pub use types::{
    BatchProgress, ConversionOutcome, ConversionRequest, ConvertedImage, ItemId, OutcomeKind,
    PendingItem, RawInput, TargetFormat,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
