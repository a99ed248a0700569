//! Built-in policies registered in every registry.

use warden_entity::ClaimSet;
use warden_entity::claim::types;
use warden_entity::role::{ADMIN, MANAGER, PLAYER};

use super::registry::PolicyRegistryBuilder;
use super::requirement::Requirement;

/// Administrators only.
pub const ADMIN_POLICY: &str = "admin";
/// Managers only.
pub const MANAGER_POLICY: &str = "manager";
/// Players only.
pub const PLAYER_POLICY: &str = "player";
/// Administrators or players.
pub const ADMIN_OR_PLAYER_POLICY: &str = "admin-or-player";
/// Administrators or managers.
pub const ADMIN_OR_MANAGER_POLICY: &str = "admin-or-manager";
/// Players whose email marks them as VIP.
pub const VIP_POLICY: &str = "vip";

/// Registers the built-in role and VIP policies.
pub fn register_builtin(builder: PolicyRegistryBuilder) -> PolicyRegistryBuilder {
    builder
        .register(ADMIN_POLICY, vec![Requirement::role_any([ADMIN])])
        .register(MANAGER_POLICY, vec![Requirement::role_any([MANAGER])])
        .register(PLAYER_POLICY, vec![Requirement::role_any([PLAYER])])
        .register(
            ADMIN_OR_PLAYER_POLICY,
            vec![Requirement::role_any([ADMIN, PLAYER])],
        )
        .register(
            ADMIN_OR_MANAGER_POLICY,
            vec![Requirement::role_any([ADMIN, MANAGER])],
        )
        .register(VIP_POLICY, vec![Requirement::composite(is_vip_player)])
}

fn is_vip_player(claims: &ClaimSet) -> bool {
    claims.has_role(PLAYER) && claims.values(types::EMAIL).any(|email| email.contains("vip"))
}
