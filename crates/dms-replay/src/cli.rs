//! Command-line interface

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Driver monitoring replay and screening tool
#[derive(Debug, Parser)]
#[command(name = "dms-replay", version, about)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify recorded landmark frames
    Replay(ReplayArgs),
    /// Screen an observation log for drowsiness episodes
    Screen(ScreenArgs),
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Recorded frames, one JSON object per line
    #[arg(short, long)]
    pub input: PathBuf,

    /// Append the combined per-frame CSV log here
    #[arg(long)]
    pub combined_csv: Option<PathBuf>,

    /// Append confirmed yawns here
    #[arg(long)]
    pub yawn_csv: Option<PathBuf>,

    /// Append observations as JSON lines here
    #[arg(long)]
    pub jsonl: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ScreenArgs {
    /// Observation log written by `replay --jsonl`
    #[arg(short, long)]
    pub input: PathBuf,

    /// Override the minimum run length
    #[arg(long)]
    pub min_consecutive: Option<usize>,

    /// Count asleep frames as drowsy
    #[arg(long)]
    pub include_asleep: bool,
}
