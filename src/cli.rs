// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `folderfeed`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "folderfeed",
    version,
    about = "Feed folders of images through a prompt graph, one batch per round.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the prompt graph config (TOML).
    ///
    /// Default: `Folderfeed.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Stop after this many rounds even if work is still queued.
    ///
    /// Overrides `[config].max_rounds`.
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FOLDERFEED_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the graph, but don't load any images.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
