//! CLI command definitions and dispatch.

pub mod authorize;
pub mod check;
pub mod hash;

use clap::{Parser, Subcommand};

use warden_core::config::AppConfig;
use warden_core::error::AppError;

/// Warden — authentication and authorization engine
#[derive(Debug, Parser)]
#[command(name = "warden", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded from `config/{env}`; falls back to WARDEN_ENV
    #[arg(short, long)]
    pub env: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate configuration and build every engine component
    Check,
    /// Print an Argon2id hash of a password
    HashPassword(hash::HashArgs),
    /// Verify a session token and evaluate a policy against it
    Authorize(authorize::AuthorizeArgs),
}

impl Cli {
    /// Loads the configuration named by the global flags.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        let env = self
            .env
            .clone()
            .or_else(|| std::env::var("WARDEN_ENV").ok())
            .unwrap_or_else(|| "development".to_string());
        AppConfig::load(&self.config, &env)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Check => check::execute(&config).await,
            Commands::HashPassword(args) => hash::execute(args),
            Commands::Authorize(args) => authorize::execute(args, &config),
        }
    }
}
