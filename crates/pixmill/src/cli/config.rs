//! The `pixmill config` command for configuration management.

use clap::{Args, Subcommand};
use pixmill_core::Config;
use std::path::Path;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration and the directories it resolves to
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            println!("{}", config.to_toml()?);
            println!("{}", describe_layout(&config));
        }

        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();
            init_at(&path, force)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

/// Resolved paths as TOML comments, so `show` output stays valid TOML.
fn describe_layout(config: &Config) -> String {
    let layout = &config.layout;
    [
        ("archive", layout.archive_path()),
        ("extract", layout.extract_root()),
        ("grayscale", layout.grayscale_root()),
        ("sepia", layout.sepia_root()),
        ("dither", layout.dither_root()),
    ]
    .iter()
    .map(|(name, path)| format!("# {name:<10} {}", path.display()))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Write a default config file at `path`.
fn init_at(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}
