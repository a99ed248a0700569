//! Bootstrap roles, the super-admin account, and optional demo accounts
//! in an empty store.

use tracing::{info, warn};

use warden_core::config::SeedConfig;
use warden_core::error::AppError;
use warden_core::traits::CredentialStore;
use warden_entity::claim::types;
use warden_entity::{Claim, NewPrincipal, PrincipalId};

use crate::password::PasswordHasher;

/// Demo accounts: email, first name, last name, role.
const DEMO_ACCOUNTS: [(&str, &str, &str, &str); 3] = [
    ("manager@gmail.com", "manager", "billah", "manager"),
    ("player@gmail.com", "player", "ullah", "player"),
    ("vipplayer@gmail.com", "vipplayer", "vip", "player"),
];

/// What [`seed_defaults`] created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Roles created.
    pub roles_created: Vec<String>,
    /// Whether the super-admin account was created.
    pub admin_created: bool,
    /// Usernames of demo accounts created.
    pub demo_accounts_created: Vec<String>,
}

/// Creates missing roles, then the super admin when no principal exists.
///
/// The super admin is pre-confirmed, holds every configured role, and
/// carries email and surname claims. An empty admin password skips it.
/// With `demo_accounts` set, a manager, a player, and a VIP player are
/// created alongside it the same way.
pub async fn seed_defaults(
    store: &dyn CredentialStore,
    hasher: &PasswordHasher,
    config: &SeedConfig,
) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();
    if !config.enabled {
        return Ok(report);
    }

    let existing = store.role_names().await?;
    for role in &config.roles {
        if !existing.iter().any(|r| r.eq_ignore_ascii_case(role)) {
            store.create_role(role).await?;
            report.roles_created.push(role.clone());
        }
    }

    if !store.list_principals().await?.is_empty() {
        return Ok(report);
    }
    if config.admin_password.is_empty() {
        warn!("seed.admin_password is empty; super admin not created");
        return Ok(report);
    }

    let admin = create_confirmed(
        store,
        hasher,
        &config.admin_email,
        &config.admin_first_name,
        &config.admin_last_name,
        &config.admin_password,
        &config.roles,
    )
    .await?;
    info!(principal_id = %admin, "Seeded super admin");
    report.admin_created = true;

    if config.demo_accounts {
        for (email, first_name, last_name, role) in DEMO_ACCOUNTS {
            let roles: Vec<String> = config
                .roles
                .iter()
                .filter(|r| r.eq_ignore_ascii_case(role))
                .cloned()
                .collect();
            if roles.is_empty() {
                warn!(role, email, "Demo account role is not seeded");
            }
            let id = create_confirmed(
                store,
                hasher,
                email,
                first_name,
                last_name,
                &config.admin_password,
                &roles,
            )
            .await?;
            info!(principal_id = %id, "Seeded demo account");
            report.demo_accounts_created.push(email.to_string());
        }
    }
    Ok(report)
}

/// Creates a confirmed local account with email and surname claims.
async fn create_confirmed(
    store: &dyn CredentialStore,
    hasher: &PasswordHasher,
    email: &str,
    first_name: &str,
    last_name: &str,
    password: &str,
    roles: &[String],
) -> Result<PrincipalId, AppError> {
    let email = email.trim().to_lowercase();
    let last_name = last_name.to_lowercase();
    let created = store
        .create(
            NewPrincipal {
                username: email.clone(),
                first_name: first_name.to_lowercase(),
                last_name: last_name.clone(),
                email: Some(email.clone()),
                email_confirmed: true,
                provider: None,
                external_id: None,
            },
            Some(hasher.hash_password(password)?),
        )
        .await?;

    if !roles.is_empty() {
        store.assign_roles(created.id, roles).await?;
    }
    store
        .add_claims(
            created.id,
            &[
                Claim::new(types::EMAIL, email),
                Claim::new(types::SURNAME, last_name),
            ],
        )
        .await?;
    Ok(created.id)
}
