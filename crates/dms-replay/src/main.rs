//! Driver Monitoring Replay - Main Entry Point

use clap::Parser;
use dms_replay::cli::{Cli, Command};
use dms_replay::settings::Settings;
use dms_replay::{init_logging, run_replay, run_screen};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    init_logging(&settings.logging, cli.verbose, cli.json_logs)?;

    info!("=== DMS Replay v{} ===", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Command::Replay(args) => {
            let stats = run_replay(args, &settings).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Screen(args) => {
            run_screen(args, &settings, std::io::stdout().lock())?;
        }
    }

    Ok(())
}
