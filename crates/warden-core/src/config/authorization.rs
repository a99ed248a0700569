//! Declarative authorization policy configuration.

use serde::{Deserialize, Serialize};

/// Policies declared in configuration, registered alongside the built-in set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    /// Additional named policies.
    #[serde(default)]
    pub policies: Vec<PolicyDefinition>,
    /// Policy names that protected resources reference. Every name must
    /// resolve when the registry is built.
    #[serde(default)]
    pub required_policies: Vec<String>,
}

/// One configured policy. Requirements present are combined with AND,
/// roles first, then the claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDefinition {
    /// Unique policy name.
    pub name: String,
    /// Grants when the caller holds any of these roles.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Claim type that must be present with `claim_value`.
    #[serde(default)]
    pub claim_type: Option<String>,
    /// Exact claim value required.
    #[serde(default)]
    pub claim_value: Option<String>,
}
