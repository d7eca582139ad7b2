//! EventDesk Backend CLI
//!
//! This is the operator entry point for EventDesk two-factor authentication.
//! It loads the backend configuration, sets up logging and runs one command:
//! - Secret generation and provisioning URIs for authenticator apps
//! - Code generation and verification against a secret
//! - Account enrollment, login checks and removal against the record file

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

use eventdesk_backend::config::Config;
use eventdesk_backend::error::{BackendError, ConfigError};
use eventdesk_backend::{execute, Command, Outcome};
use eventdesk_shared::logging::{init_logging, LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Two-factor record file (overrides storage.records_file)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Log level (error, warn, info, debug, trace); overrides logging.level
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let loaded = Config::load(&config_path);
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };

    // Initialize logging
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.debug {
        config.logging.level = LogLevel::Debug;
        config.logging.format = LogFormat::Full;
    }
    init_logging(&config.logging);

    debug!(
        "Starting EventDesk Backend v{} (log level {})",
        env!("CARGO_PKG_VERSION"),
        config.logging.level
    );

    match loaded {
        Ok(_) => {}
        Err(BackendError::Config(ConfigError::NotFound { path })) if args.config.is_none() => {
            debug!("No configuration file at {}, using defaults", path);
        }
        Err(e) => {
            warn!(
                "Failed to load config from {:?}: {}. Using defaults.",
                config_path, e
            );
        }
    }

    // Override config with command line arguments
    if let Some(store) = args.store {
        config.storage.records_file = store;
    }

    config.validate()?;
    debug!("Configuration loaded and validated");

    let mut stdout = std::io::stdout().lock();
    match execute(&args.command, &config, &mut stdout) {
        Ok(Outcome::Accepted) => Ok(ExitCode::SUCCESS),
        Ok(Outcome::Rejected) => {
            info!("Check rejected");
            Ok(ExitCode::FAILURE)
        }
        Err(e) if e.is_user_error() => {
            eprintln!("{e}");
            Ok(ExitCode::from(2))
        }
        Err(e) => {
            error!("Command failed: {}", e);
            Err(e.into())
        }
    }
}
