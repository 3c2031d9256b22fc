//! Hashsweep CLI Binary
//!
//! Command-line interface for generating checksum manifests and sweeping
//! directory trees against them.

use clap::Parser;
use hashsweep::cli::{map_error, Cli, RunContext, EXIT_FATAL, EXIT_PARTIAL_FAILURE};
use hashsweep::config::ConfigLoader;
use hashsweep::logging::{init_logging, LoggingConfig};
use std::io::IsTerminal;
use std::process;
use tracing::{error, info, warn};

fn main() {
    let cli = Cli::parse();

    // Logging comes up before anything else so config errors are visible
    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(EXIT_FATAL);
    }

    info!("Hashsweep starting");

    let context = match RunContext::new(cli.config.clone()) {
        Ok(ctx) => ctx.with_color(std::io::stdout().is_terminal()),
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(EXIT_FATAL);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output.text);
            if output.failed_files > 0 {
                warn!(failed = output.failed_files, "Command finished with failed files");
                process::exit(EXIT_PARTIAL_FAILURE);
            }
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(EXIT_FATAL);
        }
    }
}

/// Build logging configuration from CLI args, environment, and config file
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = match cli.config {
        Some(ref config_path) => ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default(),
        None => std::env::current_dir()
            .ok()
            .and_then(|cwd| ConfigLoader::load(&cwd).ok())
            .map(|c| c.logging)
            .unwrap_or_default(),
    };

    if cli.quiet {
        config.level = "off".to_string();
        return config;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }

    // CLI arguments win over everything else
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }

    config
}
