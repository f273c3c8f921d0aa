//! Bitbucket identity gate
//!
//! Runs a single authorization check against Bitbucket, or prints the
//! effective provider configuration.

use bitbucket_gate::{
    IdentityProvider, SessionState,
    auth::build_bitbucket_provider,
    config::{AppConfig, LogFormat, load_config},
};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Bitbucket identity gate - resolve and authorize an OAuth2 access token
#[derive(Parser, Debug)]
#[command(name = "bitbucket-gate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "BITBUCKET_GATE_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides logging.level
    #[arg(long, env = "BITBUCKET_GATE_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve an access token and apply the configured gates
    Check {
        /// Bitbucket OAuth2 access token
        #[arg(long, env = "BITBUCKET_GATE_ACCESS_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
    /// Print the effective provider endpoints, scope and constraints
    ShowConfig,
}

fn init_logging(config: &AppConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(config.logging.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn show_config(config: &AppConfig) -> anyhow::Result<()> {
    let provider = build_bitbucket_provider(&config.provider)?;
    let data = provider.data();

    println!("provider:     {}", data.provider_name);
    println!("login_url:    {}", data.login_url);
    println!("redeem_url:   {}", data.redeem_url);
    println!("validate_url: {}", data.validate_url);
    println!("scope:        {}", data.scope);
    println!("team:         {}", provider.team().unwrap_or("-"));
    println!("repository:   {}", provider.repository().unwrap_or("-"));
    Ok(())
}

async fn check(config: &AppConfig, token: Option<String>) -> anyhow::Result<ExitCode> {
    let session = SessionState::from_optional(token)
        .inspect_err(|e| error!(error = %e, "No usable access token"))?;

    let provider = build_bitbucket_provider(&config.provider)
        .inspect_err(|e| error!(error = %e, "Failed to create provider"))?;

    let resolution = provider
        .resolve(&session)
        .await
        .inspect_err(|e| error!(stage = %e.stage, error = %e, "Authorization check failed"))?;

    println!("{resolution}");
    if let Some(email) = resolution.email() {
        info!(email = %email, "Access granted");
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration before logging so the configured format applies
    let config = load_config(args.config.as_deref())?;
    init_logging(&config, args.log_level.as_deref());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting bitbucket-gate"
    );

    match args.command {
        Command::Check { token } => check(&config, token).await,
        Command::ShowConfig => {
            show_config(&config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
