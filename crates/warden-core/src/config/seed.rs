//! Bootstrap data for an empty credential store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Roles and super-admin account created when the store holds no principals.
#[derive(Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Whether seeding runs at all.
    #[serde(default = "super::default_true")]
    pub enabled: bool,
    /// Role names to create.
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
    /// Super-admin email, also used as its username.
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    /// Super-admin initial password. Seeding skips the account when empty.
    #[serde(default)]
    pub admin_password: String,
    /// Super-admin first name.
    #[serde(default = "default_admin_first")]
    pub admin_first_name: String,
    /// Super-admin last name.
    #[serde(default = "default_admin_last")]
    pub admin_last_name: String,
    /// Also create the manager, player, and VIP player demo accounts.
    /// They share the super-admin password.
    #[serde(default)]
    pub demo_accounts: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            roles: default_roles(),
            admin_email: default_admin_email(),
            admin_password: String::new(),
            admin_first_name: default_admin_first(),
            admin_last_name: default_admin_last(),
            demo_accounts: false,
        }
    }
}

impl fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedConfig")
            .field("enabled", &self.enabled)
            .field("roles", &self.roles)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &"<redacted>")
            .field("demo_accounts", &self.demo_accounts)
            .finish()
    }
}

fn default_roles() -> Vec<String> {
    vec![
        "admin".to_string(),
        "manager".to_string(),
        "player".to_string(),
    ]
}

fn default_admin_email() -> String {
    "admin@gmail.com".to_string()
}

fn default_admin_first() -> String {
    "admin".to_string()
}

fn default_admin_last() -> String {
    "billah".to_string()
}
