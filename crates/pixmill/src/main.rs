//! Pixmill CLI - unzip an image archive and render filtered copies.
//!
//! Pixmill extracts `myfile.zip`, finds every PNG inside it and writes a
//! grayscale, a sepia and a dithered copy of each into mirrored directory
//! trees next to the archive.
//!
//! # Usage
//!
//! ```bash
//! # Run the whole batch in the current directory
//! pixmill
//!
//! # Somewhere else, only sepia, with a report
//! pixmill --base-dir ./shoot --only sepia --report report.jsonl
//!
//! # View configuration
//! pixmill config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Pixmill - unzip an image archive and render grayscale, sepia and dithered copies.
#[derive(Parser, Debug)]
#[command(name = "pixmill")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Batch options used when no subcommand is given
    #[command(flatten)]
    run: cli::run::RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract the archive and run every transform (the default)
    Run(cli::run::RunArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match pixmill_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `pixmill config path`."
            );
            pixmill_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Pixmill v{}", pixmill_core::VERSION);

    match cli.command {
        Some(Commands::Run(args)) => cli::run::execute(args, config).await,
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None => cli::run::execute(cli.run, config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pixmill_core::TransformKind;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_runs_the_batch() {
        let cli = Cli::try_parse_from(["pixmill"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.run.base_dir.is_none());
        assert_eq!(cli.run.kinds(), TransformKind::ALL.to_vec());
    }

    #[test]
    fn top_level_run_flags_parse() {
        let cli = Cli::try_parse_from([
            "pixmill",
            "--base-dir",
            "/tmp/shoot",
            "-p",
            "2",
            "--only",
            "dither",
            "--strict",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.parallel, Some(2));
        assert_eq!(cli.run.kinds(), vec![TransformKind::Dither]);
        assert!(cli.run.strict);
    }

    #[test]
    fn config_subcommand_parses() {
        let cli =
            Cli::try_parse_from(["pixmill", "config", "init", "--force", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Config(_))));
    }

    #[test]
    fn run_flags_conflict_with_subcommands() {
        assert!(Cli::try_parse_from(["pixmill", "--strict", "config", "path"]).is_err());
    }
}
