//! Batch run: progress bar, writing artifacts, summary and report.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use recast_core::report::truncate_filename;
use recast_core::{
    format_bytes, BatchSummary, ConversionOutcome, ConversionSession, OutcomeRecord, OutputWriter,
    Report,
};

use super::setup::report_path;
use super::ConvertContext;

/// Convert every item in the session, save successes and report the results.
pub async fn run_batch(
    session: &mut ConversionSession,
    ctx: &ConvertContext,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(&ctx.output_dir)?;

    let progress = create_progress_bar(session.items().len() as u64);
    let start_time = Instant::now();

    let outcomes = session
        .convert(ctx.request.clone(), |state, outcome| {
            progress.set_position(state.completed as u64);
            progress.set_message(truncate_filename(outcome.source_filename(), 24));
            if let ConversionOutcome::Failure(failure) = outcome {
                progress.suspend(|| {
                    tracing::warn!("{}: {}", failure.source_filename, failure.message())
                });
            }
        })
        .await?;

    let elapsed = start_time.elapsed();
    progress.finish_and_clear();

    let mut records = Vec::with_capacity(outcomes.len());
    let mut taken = HashSet::new();
    for outcome in outcomes {
        let record = OutcomeRecord::from(outcome);
        let ConversionOutcome::Success(image) = outcome else {
            records.push(record);
            continue;
        };

        let path = unique_path(&ctx.output_dir, &image.output_filename, &mut taken);
        match std::fs::write(&path, &image.output_bytes) {
            Ok(()) => {
                tracing::info!(
                    "{} ({}) -> {} ({})",
                    image.source_filename,
                    format_bytes(image.source_size, 2),
                    path.display(),
                    format_bytes(image.output_size, 2)
                );
                records.push(record.with_output_path(path.display().to_string()));
            }
            Err(e) => {
                tracing::error!("Failed to write {}: {e}", path.display());
                records.push(record);
            }
        }
    }

    let summary =
        BatchSummary::from_outcomes(ctx.request.target_format.clone(), outcomes, elapsed);
    print_summary(&summary, &ctx.output_dir);

    if let Some((path, format)) = &ctx.report {
        let path = report_path(path.clone(), *format);
        let file = File::create(&path)?;
        let mut writer = OutputWriter::new(
            BufWriter::new(file),
            (*format).into(),
            ctx.config.output.pretty,
        );
        writer.write_report(&Report {
            summary: summary.clone(),
            outcomes: records,
        })?;
        tracing::info!("Report written to {:?}", path);
    }

    if summary.succeeded == 0 {
        anyhow::bail!("All {} conversion(s) failed", summary.total);
    }
    Ok(())
}

/// Output path for `filename`, suffixed `-2`, `-3`, ... when an earlier item
/// of this run already claimed the name.
fn unique_path(dir: &Path, filename: &str, taken: &mut HashSet<String>) -> PathBuf {
    if taken.insert(filename.to_string()) {
        return dir.join(filename);
    }

    let (stem, ext) = filename.rsplit_once('.').unwrap_or((filename, ""));
    let mut n = 2;
    loop {
        let candidate = if ext.is_empty() {
            format!("{stem}-{n}")
        } else {
            format!("{stem}-{n}.{ext}")
        };
        if taken.insert(candidate.clone()) {
            return dir.join(candidate);
        }
        n += 1;
    }
}

/// Create a progress bar for the batch.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after the batch.
fn print_summary(summary: &BatchSummary, output_dir: &Path) {
    let size_change = if summary.bytes_in > 0 {
        (summary.bytes_out as f64 / summary.bytes_in as f64) * 100.0 - 100.0
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("           Summary ({})", summary.target_format);
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.total);
    eprintln!("    Duration:     {:>7.1}s", summary.elapsed_ms as f64 / 1000.0);
    eprintln!("    Rate:         {:>7.1} img/sec", summary.rate());
    eprintln!("    Input:        {:>11}", format_bytes(summary.bytes_in, 1));
    eprintln!("    Output:       {:>11}", format_bytes(summary.bytes_out, 1));
    eprintln!("    Size change:  {:>+7.1}%", size_change);
    eprintln!("  ====================================");
    eprintln!("    Saved to {}", output_dir.display());
}
