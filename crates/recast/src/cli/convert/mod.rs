//! The `recast convert` command.

mod batch;
mod setup;
pub mod types;

pub use types::ReportFormat;

use clap::Args;
use recast_core::{Config, ConversionRequest, ConversionSession, FileDiscovery};
use std::path::PathBuf;

use batch::run_batch;
use setup::setup_conversion;

/// Arguments for the `convert` command.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Image files or directories to convert
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Target format (jpg, png, webp, gif, bmp, svg)
    #[arg(short, long)]
    pub to: String,

    /// Encoder quality from 0.0 to 1.0 (jpg and webp)
    #[arg(short, long)]
    pub quality: Option<f32>,

    /// Output width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Stretch to the exact width and height instead of keeping proportions
    #[arg(long)]
    pub no_keep_aspect: bool,

    /// Directory for converted files [default: from config, ./converted]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Number of images converted concurrently [default: from config]
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Write a per-file report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Report format [default: from config]
    #[arg(long, value_enum)]
    pub report_format: Option<ReportFormat>,
}

/// Everything the batch step needs, assembled by `setup_conversion()`.
pub(crate) struct ConvertContext {
    pub config: Config,
    pub request: ConversionRequest,
    pub output_dir: PathBuf,
    pub report: Option<(PathBuf, ReportFormat)>,
}

/// Execute the convert command.
pub async fn execute(args: ConvertArgs, config: Config) -> anyhow::Result<()> {
    let ctx = setup_conversion(&args, config)?;

    let discovery = FileDiscovery::new(ctx.config.input.clone());
    let files = discovery.discover_all(&args.inputs);
    if files.is_empty() {
        tracing::warn!("No supported image files found in {:?}", args.inputs);
        return Ok(());
    }
    tracing::info!(
        "Found {} image(s), {} total",
        files.len(),
        recast_core::format_bytes(FileDiscovery::total_size(&files), 1)
    );

    let mut inputs = Vec::with_capacity(files.len());
    for file in &files {
        match file.load().await {
            Ok(raw) => inputs.push(raw),
            Err(e) => tracing::warn!("Cannot read {:?}: {e}", file.path),
        }
    }

    let mut session = ConversionSession::new(&ctx.config);
    let accepted = session.add(inputs).await;
    if accepted == 0 {
        anyhow::bail!(
            "None of the {} file(s) could be loaded as images.\n\n  \
             Hint: run with --verbose to see why each file was skipped.",
            files.len()
        );
    }

    run_batch(&mut session, &ctx).await
}
