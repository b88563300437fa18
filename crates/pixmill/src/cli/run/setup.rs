//! Run setup: apply CLI overrides to the loaded config.

use pixmill_core::Config;

use super::RunArgs;

/// Layer command-line overrides on top of `config` and re-validate it.
///
/// `config` is whatever startup loaded, including the defaults it falls back
/// to when the config file is unreadable; the file is not read again here.
pub fn build_config(mut config: Config, args: &RunArgs) -> anyhow::Result<Config> {
    if let Some(ref base_dir) = args.base_dir {
        if !base_dir.is_dir() {
            anyhow::bail!(
                "Base directory does not exist: {:?}\n\n  Hint: Check the path and try again.",
                base_dir
            );
        }
        config.layout.base_dir = base_dir.clone();
    }

    if let Some(ref archive) = args.archive {
        config.layout.archive = archive.clone();
    }

    if let Some(parallel) = args.parallel {
        config.processing.parallel_workers = parallel;
    }

    config.validate()?;

    tracing::debug!(
        "Layout: archive {:?}, extract {:?}, {} worker(s)",
        config.layout.archive_path(),
        config.layout.extract_root(),
        config.processing.parallel_workers
    );

    Ok(config)
}
