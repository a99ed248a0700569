//! Immutable lookup table of named policies.

use std::collections::HashMap;

use tracing::debug;

use warden_core::config::{AuthorizationConfig, PolicyDefinition};
use warden_core::error::AppError;
use warden_entity::ClaimSet;

use super::defaults;
use super::requirement::Requirement;

/// A named, ordered list of requirements. All must hold.
#[derive(Debug, Clone)]
pub struct Policy {
    /// Policy name.
    name: String,
    /// Requirements, evaluated left to right.
    requirements: Vec<Requirement>,
}

impl Policy {
    /// Returns the policy name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the requirements in registration order.
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Short-circuit AND over the requirements.
    pub fn evaluate(&self, claims: &ClaimSet) -> bool {
        self.requirements.iter().all(|req| req.is_satisfied(claims))
    }
}

/// Collects policies before they are frozen into a [`PolicyRegistry`].
///
/// Registration problems are reported together by [`Self::build`].
#[derive(Debug, Default)]
pub struct PolicyRegistryBuilder {
    policies: Vec<Policy>,
    errors: Vec<String>,
}

impl PolicyRegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a policy.
    pub fn register(mut self, name: impl Into<String>, requirements: Vec<Requirement>) -> Self {
        let name = name.into();
        if name.trim().is_empty() {
            self.errors.push("policy name must not be empty".to_string());
        } else if requirements.is_empty() {
            self.errors.push(format!("policy '{name}' has no requirements"));
        } else if self.policies.iter().any(|p| p.name == name) {
            self.errors
                .push(format!("policy '{name}' is registered more than once"));
        } else {
            self.policies.push(Policy { name, requirements });
        }
        self
    }

    /// Registers a policy declared in configuration.
    ///
    /// A role list becomes a role requirement and a claim type/value pair a
    /// claim requirement, in that order.
    pub fn register_definition(mut self, definition: &PolicyDefinition) -> Self {
        let mut requirements = Vec::new();
        if !definition.roles.is_empty() {
            requirements.push(Requirement::role_any(definition.roles.iter().cloned()));
        }
        match (&definition.claim_type, &definition.claim_value) {
            (Some(claim_type), Some(value)) => {
                requirements.push(Requirement::claim_equals(claim_type.clone(), value.clone()));
            }
            (None, None) => {}
            _ => {
                self.errors.push(format!(
                    "policy '{}' must set both claim_type and claim_value",
                    definition.name
                ));
                return self;
            }
        }
        self.register(definition.name.clone(), requirements)
    }

    /// Freezes the registry, checking every name in `required` resolves.
    pub fn build<S: AsRef<str>>(self, required: &[S]) -> Result<PolicyRegistry, AppError> {
        let mut errors = self.errors;
        let policies: HashMap<String, Policy> = self
            .policies
            .into_iter()
            .map(|policy| (policy.name.clone(), policy))
            .collect();

        for name in required {
            let name = name.as_ref();
            if !policies.contains_key(name) {
                errors.push(format!("required policy '{name}' is not registered"));
            }
        }

        if !errors.is_empty() {
            return Err(AppError::configuration(format!(
                "Invalid authorization policies: {}",
                errors.join("; ")
            )));
        }

        Ok(PolicyRegistry { policies })
    }
}

/// Process-wide, read-only table of policies keyed by name.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    policies: HashMap<String, Policy>,
}

impl PolicyRegistry {
    /// Starts a builder with no policies.
    pub fn builder() -> PolicyRegistryBuilder {
        PolicyRegistryBuilder::new()
    }

    /// Starts a builder preloaded with the built-in policies.
    pub fn standard() -> PolicyRegistryBuilder {
        defaults::register_builtin(PolicyRegistryBuilder::new())
    }

    /// Builds the built-in policies plus those declared in configuration.
    pub fn from_config(config: &AuthorizationConfig) -> Result<Self, AppError> {
        config
            .policies
            .iter()
            .fold(Self::standard(), |builder, definition| {
                builder.register_definition(definition)
            })
            .build(config.required_policies.as_slice())
    }

    /// Evaluates the named policy against `claims`.
    ///
    /// An unregistered name is a configuration error, never a deny.
    pub fn authorize(&self, claims: &ClaimSet, policy: &str) -> Result<bool, AppError> {
        let found = self.policies.get(policy).ok_or_else(|| {
            AppError::configuration(format!("Authorization policy '{policy}' is not registered"))
        })?;
        let allowed = found.evaluate(claims);
        debug!(policy, allowed, "Evaluated authorization policy");
        Ok(allowed)
    }

    /// Whether a policy with this name is registered.
    pub fn contains(&self, policy: &str) -> bool {
        self.policies.contains_key(policy)
    }

    /// Returns a registered policy.
    pub fn get(&self, policy: &str) -> Option<&Policy> {
        self.policies.get(policy)
    }

    /// Registered policy names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.policies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
