//! Password hashing command.

use clap::Args;

use warden_auth::PasswordHasher;
use warden_core::error::AppError;

/// Arguments for `hash-password`
#[derive(Debug, Args)]
pub struct HashArgs {
    /// Plaintext password to hash
    pub password: String,
}

/// Prints the PHC-format hash.
pub fn execute(args: &HashArgs) -> Result<(), AppError> {
    let hash = PasswordHasher::new().hash_password(&args.password)?;
    println!("{hash}");
    Ok(())
}
