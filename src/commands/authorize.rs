//! Token authorization command.

use clap::Args;

use warden_auth::{PolicyRegistry, TokenVerifier};
use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_entity::ClaimSet;

/// Arguments for `authorize`
#[derive(Debug, Args)]
pub struct AuthorizeArgs {
    /// Session token to verify
    #[arg(short, long)]
    pub token: String,

    /// Policy to evaluate
    #[arg(short, long)]
    pub policy: String,
}

/// Prints `allow` or `deny`. Bad tokens and unknown policies are errors.
pub fn execute(args: &AuthorizeArgs, config: &AppConfig) -> Result<(), AppError> {
    let verifier = TokenVerifier::new(&config.auth.token)?;
    let policies = PolicyRegistry::from_config(&config.authorization)?;

    let claims = verifier.verify(&args.token)?;
    let allowed = policies.authorize(&ClaimSet::from(&claims), &args.policy)?;

    tracing::info!(
        principal_id = %claims.sub,
        policy = %args.policy,
        allowed,
        "Authorization checked"
    );
    println!("{}", if allowed { "allow" } else { "deny" });
    Ok(())
}
