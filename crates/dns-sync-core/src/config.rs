//! Configuration types for the dns-sync system
//!
//! This module defines the operator-facing configuration structures and
//! their bridges to runtime values.

use serde::{Deserialize, Serialize};

use crate::policy::Policy;

/// Main sync configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Policy applied to every computed change set
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Registry interposed between the control loop and the provider
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl SyncConfig {
    /// Create a configuration with defaults (sync policy, noop registry)
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.registry.validate()
    }
}

/// Policy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyConfig {
    /// Full synchronization, deletes included
    #[default]
    Sync,
    /// Additive-only convergence, never deletes
    UpsertOnly,
}

impl PolicyConfig {
    /// Bridge to the runtime policy value
    pub fn to_policy(self) -> Policy {
        match self {
            PolicyConfig::Sync => Policy::Sync,
            PolicyConfig::UpsertOnly => Policy::UpsertOnly,
        }
    }
}

/// Registry selection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryConfig {
    /// No ownership semantics; changes pass straight through
    #[default]
    Noop,

    /// Label-based ownership filtering
    Label {
        /// Owner id this instance claims records under
        owner_id: String,
    },
}

impl RegistryConfig {
    /// Validate the registry configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            RegistryConfig::Label { owner_id } if owner_id.is_empty() => Err(crate::Error::config(
                "label registry owner id cannot be empty",
            )),
            _ => Ok(()),
        }
    }
}
