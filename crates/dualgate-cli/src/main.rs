//! Dualgate - two-factor credential verification
//!
//! Verifies a directory password and a one-time code, then releases the
//! identity attributes of the verified user.

use clap::{Parser, Subcommand};
use dualgate_auth::{Backends, CredentialVerifier, LdapDirectoryClient, RadiusClient};
use dualgate_core::config::LoggingConfig;
use dualgate_core::DualgateConfig;
use dualgate_store::SqlIdentityStore;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "dualgate")]
#[command(author = "Dualgate Team")]
#[command(version = dualgate_core::VERSION)]
#[command(about = "Two-factor directory and one-time code verification", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DUALGATE_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "DUALGATE_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a password and one-time code for a user
    Verify {
        /// Username to verify
        #[arg(short, long)]
        username: String,

        /// Directory password
        #[arg(long, env = "DUALGATE_PASSWORD", hide_env_values = true, default_value = "")]
        password: String,

        /// One-time code
        #[arg(long, env = "DUALGATE_CODE", hide_env_values = true, default_value = "")]
        code: String,
    },

    /// Validate the configuration and exit
    CheckConfig,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Load or create config
    let mut config = if let Some(config_path) = &cli.config {
        let mut config = DualgateConfig::from_file(config_path)?;
        config.apply_env();
        config
    } else {
        DualgateConfig::from_env()
    };

    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging);

    match cli.command {
        Commands::Version => {
            println!("dualgate {}", dualgate_core::VERSION);
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckConfig => {
            config.validate()?;
            if config.effective_bypass().any() {
                println!("configuration valid (debug bypass enabled: {:?})", config.bypass);
            } else {
                println!("configuration valid");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Verify {
            username,
            password,
            code,
        } => run_verify(&config, &username, &password, &code).await,
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout carries only the verification result
    if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

async fn run_verify(
    config: &DualgateConfig,
    username: &str,
    password: &str,
    code: &str,
) -> anyhow::Result<ExitCode> {
    config.validate()?;

    info!("Opening identity store");
    let store = SqlIdentityStore::from_config(&config.store).await?;

    let backends = Backends::new(
        Arc::new(LdapDirectoryClient::new()),
        Arc::new(RadiusClient::from_config(&config.second_factor)),
        Arc::new(store),
    );

    let verifier = CredentialVerifier::new(username, config, &backends)?;
    let verification = verifier.verify(password, code).await;

    println!("{}", serde_json::to_string_pretty(&verification)?);

    if verification.is_verified() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
