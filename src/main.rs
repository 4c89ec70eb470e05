// Healthport - Apple Health export to CSV converter
// Copyright (c) 2025 Healthport Contributors
// Licensed under the MIT License

use clap::Parser;
use healthport::cli::{load_settings, Cli, Commands};
use healthport::config::LoggingConfig;
use healthport::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging follows the configuration when it loads; commands report load errors themselves
    let settings = load_settings(cli.config.as_deref()).ok();
    let logging_config = settings
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_else(LoggingConfig::default);
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| settings.map(|config| config.application.log_level))
        .unwrap_or_else(|| "info".to_string());

    let logging_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Healthport - Apple Health export to CSV converter"
    );

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    // Flush file logs before exiting
    drop(logging_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Convert(args) => args.execute(config).await,
        Commands::ValidateConfig(args) => args.execute(config).await,
        Commands::Init(args) => args.execute().await,
    }
}
