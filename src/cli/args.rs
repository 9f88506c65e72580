//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    car::CarCommands, completions::CompletionsArgs, init::InitArgs, install::InstallCommands,
    part::PartCommands, status::StatusArgs, team::TeamCommands, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "pitlane")]
#[command(author, version, about = "Race car part lifecycle tracking")]
#[command(long_about = "Tracks regulated race car parts against their FIA lifecycle limits: cumulative mileage, installation history and replacement warnings, read from a store snapshot.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose (debug) logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .pitlane/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new pitlane project
    Init(InitArgs),

    /// Teams
    #[command(subcommand)]
    Team(TeamCommands),

    /// Cars and their installation history
    #[command(subcommand)]
    Car(CarCommands),

    /// Parts and their lifecycle status
    #[command(subcommand)]
    Part(PartCommands),

    /// Installation records (a part fitted to a car)
    #[command(subcommand)]
    Install(InstallCommands),

    /// Show fleet lifecycle dashboard
    Status(StatusArgs),

    /// Check the snapshot for unreadable files and inconsistent records
    Validate(ValidateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
