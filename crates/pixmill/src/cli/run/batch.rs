//! Batch driver: extraction, job fan-out with progress, summary and report.

use std::path::Path;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use pixmill_core::{write_report_file, BatchOrchestrator, BatchReport, BatchOptions};

use super::RunArgs;

/// Run the whole batch with a progress bar and print a summary.
///
/// Same stages as [`BatchOrchestrator::run`]; the plan is taken first so the
/// bar knows its length. Extraction and discovery errors are returned; failed
/// jobs only show up in the report.
pub async fn run_batch(
    orchestrator: &BatchOrchestrator,
    args: &RunArgs,
) -> anyhow::Result<BatchReport> {
    let options = BatchOptions {
        kinds: args.kinds(),
        skip_extract: args.skip_extract,
    };
    let start_time = Instant::now();

    let jobs = orchestrator.prepare(&options).await?;
    let progress = create_progress_bar(jobs.len() as u64);
    let progress_cb = progress.clone();

    let report = orchestrator
        .run_jobs(jobs, move |outcome| {
            progress_cb.inc(1);
            let name = outcome
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            progress_cb.set_message(format!("{} {}", outcome.kind, name));
        })
        .await;

    progress.finish_and_clear();

    if !report.outcomes.is_empty() {
        for kind in &options.kinds {
            tracing::info!("Wrote {} output to {:?}", kind, orchestrator.output_root(*kind));
        }
    }

    if let Some(ref path) = args.report {
        write_report(&report, path)?;
    }

    print_summary(&report, start_time.elapsed());
    Ok(report)
}

fn write_report(report: &BatchReport, path: &Path) -> anyhow::Result<()> {
    write_report_file(report, path)?;
    tracing::info!("Report written to {:?}", path);
    Ok(())
}

/// Create a progress bar for the job phase.
fn create_progress_bar(total: u64) -> ProgressBar {
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
fn print_summary(report: &BatchReport, elapsed: std::time::Duration) {
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        report.succeeded() as f64 / secs
    } else {
        0.0
    };
    let mb_written = report.bytes_written() as f64 / 1_000_000.0;

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Images:       {:>8}", report.images);
    eprintln!("    Succeeded:    {:>8}", report.succeeded());
    if report.failed() > 0 {
        eprintln!("    Failed:       {:>8}", report.failed());
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Jobs:         {:>8}", report.outcomes.len());
    eprintln!("    Written:      {:>7.1} MB", mb_written);
    eprintln!("    Duration:     {:>7.1}s", secs);
    eprintln!("    Rate:         {:>7.1} jobs/sec", rate);
    eprintln!("  ====================================");

    for failure in report.failures() {
        eprintln!(
            "    {} {:?}: {}",
            failure.kind,
            failure.source,
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }
}
