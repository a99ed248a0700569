//! Configuration check command.

use std::sync::Arc;

use warden_auth::{AuthEngine, PasswordHasher, seed_defaults};
use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_store::{MemoryCredentialStore, MemoryOutbox};

/// Builds the engine against an in-memory store and reports what resolved.
///
/// Any configuration error aborts with a non-zero exit.
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let store = Arc::new(MemoryCredentialStore::new());
    let engine = AuthEngine::from_config(config, store.clone(), Arc::new(MemoryOutbox::new()))?;
    let seeded = seed_defaults(store.as_ref(), &PasswordHasher::new(), &config.seed).await?;

    println!("Configuration is valid");
    println!("  Issuer: {}", config.auth.token.issuer);
    println!("  Token validity: {} days", config.auth.token.validity_days);
    println!(
        "  Lockout: {} attempts, {} minutes",
        config.auth.lockout.max_attempts, config.auth.lockout.duration_minutes
    );
    println!("  Policies: {}", engine.policies().names().join(", "));
    println!(
        "  Seed: {} roles, super admin {}, {} demo accounts",
        seeded.roles_created.len(),
        if seeded.admin_created { "created" } else { "skipped" },
        seeded.demo_accounts_created.len()
    );
    Ok(())
}
