//! Command-line parsing for the health dashboard front-end.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the ingest pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::ExportFormat;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "health", version, about = "Health tracking series loader and status cards")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the latest observation as status cards with goal deltas.
    Status(LoadArgs),
    /// Print the full normalized series as a table.
    Series(LoadArgs),
    /// Write the normalized series to a file.
    Export(ExportArgs),
    /// Reload on an interval and reprint the status cards.
    Watch(WatchArgs),
}

/// Where to load from and how to print it.
#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    /// Spreadsheet share link or CSV URL.
    #[arg(long, conflicts_with_all = ["file", "demo"])]
    pub url: Option<String>,

    /// Local CSV file.
    #[arg(long, value_name = "CSV", conflicts_with = "demo")]
    pub file: Option<PathBuf>,

    /// Use the embedded demo table.
    #[arg(long)]
    pub demo: bool,

    /// JSON profile with goal and alias overrides.
    #[arg(long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Options for `export`.
#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    /// Output path.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,
}

/// Options for `watch`.
#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    /// Seconds between reloads.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Stop after this many reloads (runs until interrupted when omitted).
    #[arg(long)]
    pub iterations: Option<u64>,
}
