//! Conversion pipeline components.
//!
//! - **dimensions**: output size resolution and the resize-field helper
//! - **capability**: which formats can be produced, and how
//! - **codec**: probe / decode / resize / encode boundary
//! - **naming**: output filenames
//! - **converter**: one item, request in, outcome out
//! - **batch**: many items concurrently, with progress
//! - **sniff**, **ingest**, **discovery**: getting bytes into the pipeline

pub mod batch;
pub mod capability;
pub mod codec;
pub mod converter;
pub mod dimensions;
pub mod discovery;
pub mod ingest;
pub mod naming;
pub mod sniff;

// Re-exports for convenient access
pub use batch::BatchRunner;
pub use capability::{capability, known_formats, supported_formats, FormatCapability};
pub use codec::{Codec, NativeCodec};
pub use converter::Converter;
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use ingest::Ingestor;
pub use naming::output_filename;
pub use sniff::sniff_mime;
