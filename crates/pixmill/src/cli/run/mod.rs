//! The `pixmill run` command, also used when no subcommand is given.

mod batch;
mod setup;
pub mod types;

pub use types::TransformArg;

use clap::Args;
use pixmill_core::{BatchOrchestrator, Config, TransformKind};
use std::path::PathBuf;

use batch::run_batch;
use setup::build_config;

/// Arguments for the `run` command.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Directory holding the archive and the output trees (defaults to the current directory)
    #[arg(long, env = "PIXMILL_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    /// Archive to extract, relative to the base directory
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Maximum number of jobs in flight
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Only run these transforms (repeatable)
    #[arg(long, value_enum)]
    pub only: Vec<TransformArg>,

    /// Process the existing extraction tree instead of unpacking the archive
    #[arg(long)]
    pub skip_extract: bool,

    /// Write the per-job report to this file (.jsonl for JSON Lines)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Exit with an error when any job failed
    #[arg(long)]
    pub strict: bool,
}

impl RunArgs {
    /// Transforms to run, in canonical order, without duplicates.
    pub fn kinds(&self) -> Vec<TransformKind> {
        if self.only.is_empty() {
            return TransformKind::ALL.to_vec();
        }
        TransformKind::ALL
            .into_iter()
            .filter(|kind| self.only.iter().any(|arg| TransformKind::from(*arg) == *kind))
            .collect()
    }
}

/// Execute the run command against the config loaded at startup.
pub async fn execute(args: RunArgs, config: Config) -> anyhow::Result<()> {
    let config = build_config(config, &args)?;
    let orchestrator = BatchOrchestrator::new(&config);

    let report = run_batch(&orchestrator, &args).await?;

    if args.strict && !report.is_clean() {
        anyhow::bail!(
            "{} of {} job(s) failed",
            report.failed(),
            report.outcomes.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_args_default_has_no_overrides() {
        let args = RunArgs::default();
        assert!(args.base_dir.is_none());
        assert!(args.archive.is_none());
        assert!(args.parallel.is_none());
        assert!(args.report.is_none());
    }

    #[test]
    fn run_args_default_bool_flags_are_false() {
        let args = RunArgs::default();
        assert!(!args.skip_extract);
        assert!(!args.strict);
    }

    #[test]
    fn run_args_default_runs_every_transform() {
        assert_eq!(RunArgs::default().kinds(), TransformKind::ALL.to_vec());
    }

    #[test]
    fn run_args_only_is_deduplicated_and_ordered() {
        let args = RunArgs {
            only: vec![
                TransformArg::Dither,
                TransformArg::Grayscale,
                TransformArg::Dither,
            ],
            ..Default::default()
        };
        assert_eq!(
            args.kinds(),
            vec![TransformKind::Grayscale, TransformKind::Dither]
        );
    }

    #[tokio::test]
    async fn execute_fails_without_archive() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            base_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let err = execute(args, Config::default()).await.unwrap_err();
        assert!(err.to_string().contains("myfile.zip"));
    }
}
