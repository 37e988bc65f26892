use std::process::ExitCode;

use clap::Parser;

use pushforge_settings::{load_settings, load_settings_from_path};
use pushforge_telemetry::{init_telemetry, TelemetryConfig};

mod cli;
mod commands;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => load_settings_from_path(path),
        None => load_settings(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: could not load settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    let level = cli.log.as_deref().unwrap_or(&settings.logging.level);
    init_telemetry(TelemetryConfig::from_level_name(level, cli.json_logs || settings.logging.json));
    tracing::debug!(command = ?cli.command, "starting");

    match commands::run(cli.command, settings).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
