mod change_log;
mod cli;
mod config;
mod error;
mod logging;
mod operations;
mod schema;
mod validation;
mod workbook;

use std::process::ExitCode;

use clap::Parser;

use cli::Cli;
use config::AppConfig;
use logging::LogFormat;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let loaded = AppConfig::load();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| loaded.config.log_level.clone());
    let format = if loaded.config.json_logging {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    logging::init(&level, format);

    for warning in &loaded.warnings {
        log::warn!("{}", warning);
    }
    if let Some(source) = &loaded.source {
        log::debug!("Loaded config from {}", source.display());
    }

    match cli::run(cli.command, &loaded.config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("Command failed: {:?}", e);
            cli::report_error(&e);
            ExitCode::from(cli::exit_code(&e))
        }
    }
}
