//! Conversion setup: input checks, config overrides, request assembly.

use recast_core::pipeline::capability;
use recast_core::{Config, ConversionRequest, ReportFormat as CoreReportFormat, TargetFormat};
use std::path::PathBuf;

use super::types::ReportFormat;
use super::{ConvertArgs, ConvertContext};

/// Validate inputs, apply CLI overrides to the config, and build the request.
pub fn setup_conversion(
    args: &ConvertArgs,
    mut config: Config,
) -> anyhow::Result<ConvertContext> {
    for input in &args.inputs {
        if !input.exists() {
            anyhow::bail!(
                "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
                input
            );
        }
    }

    if let Some(parallel) = args.parallel {
        if parallel == 0 {
            anyhow::bail!("--parallel must be at least 1");
        }
        config.batch.parallel_workers = parallel;
    }
    if let Some(dir) = &args.output_dir {
        config.conversion.output_dir = dir.clone();
    }

    let request = build_request(args, &config)?;
    let output_dir = config.output_dir();
    let report = args.report.clone().map(|path| {
        let format = args
            .report_format
            .unwrap_or_else(|| report_format_from_config(&config));
        (path, format)
    });

    Ok(ConvertContext {
        config,
        request,
        output_dir,
        report,
    })
}

/// Turn CLI flags plus config defaults into a validated request.
pub fn build_request(args: &ConvertArgs, config: &Config) -> anyhow::Result<ConversionRequest> {
    let format = TargetFormat::parse(&args.to);
    let cap = capability(&format);
    if !cap.encodable {
        // Still runs: every item reports the unsupported format individually.
        tracing::warn!("{} cannot be produced; every image will fail", format);
    }

    let mut request = ConversionRequest::new(format)
        .with_size(args.width, args.height)
        .with_keep_aspect_ratio(config.conversion.keep_aspect_ratio && !args.no_keep_aspect);

    if cap.uses_quality {
        request = request.with_quality(args.quality.unwrap_or(config.conversion.default_quality));
    } else if args.quality.is_some() {
        tracing::warn!("--quality has no effect for {}", request.target_format);
    }

    request
        .validate_within(config.limits.max_image_dimension)
        .map_err(|e| anyhow::anyhow!("Invalid conversion settings: {e}"))?;
    Ok(request)
}

fn report_format_from_config(config: &Config) -> ReportFormat {
    match CoreReportFormat::parse(&config.output.format) {
        Some(CoreReportFormat::JsonLines) => ReportFormat::Jsonl,
        _ => ReportFormat::Json,
    }
}

/// Where a run writes its report when `--report` points at a directory.
pub fn report_path(path: PathBuf, format: ReportFormat) -> PathBuf {
    if path.is_dir() {
        path.join(format!("recast-report.{format}"))
    } else {
        path
    }
}
