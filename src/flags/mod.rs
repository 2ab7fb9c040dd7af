//! Feature-flag evaluation scoped to tenants.
//!
//! Only the tenant-interacting surface lives here: a capability interface
//! and a static in-memory provider with per-tenant overrides. Remote flag
//! backends are stubbed out of scope; they would implement the same trait
//! and be selected at construction time.

use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use utoipa::ToSchema;

/// Value of an evaluated flag.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FlagValue {
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Number(value) => *value != 0.0,
            Self::Text(value) => !value.is_empty(),
        }
    }
}

/// Capability interface for flag backends.
pub trait FlagProvider: Send + Sync {
    /// Prepare the provider for evaluation.
    ///
    /// # Errors
    ///
    /// Backend-specific; the static provider never fails.
    fn initialize(&self) -> Result<()>;

    /// Evaluate a flag as a boolean for a tenant.
    fn is_enabled(&self, flag: &str, tenant_id: &str) -> bool;

    /// Evaluate a flag's value for a tenant. `None` means unknown flag.
    fn value(&self, flag: &str, tenant_id: &str) -> Option<FlagValue>;

    /// All flags as evaluated for a tenant.
    fn all_flags(&self, tenant_id: &str) -> BTreeMap<String, FlagValue>;

    /// Re-read backing data.
    ///
    /// # Errors
    ///
    /// Backend-specific; the static provider never fails.
    fn refresh(&self) -> Result<()>;
}

/// Flag state: global defaults plus per-tenant overrides.
#[derive(Debug, Default, Clone)]
pub struct FlagSet {
    pub defaults: BTreeMap<String, FlagValue>,
    pub tenant_overrides: HashMap<String, BTreeMap<String, FlagValue>>,
}

/// In-memory provider over a [`FlagSet`]. Refresh swaps the whole set
/// back in, which for static data is a no-op kept for interface parity.
#[derive(Debug, Default)]
pub struct StaticFlagProvider {
    flags: RwLock<FlagSet>,
}

impl StaticFlagProvider {
    #[must_use]
    pub fn new(flags: FlagSet) -> Self {
        Self {
            flags: RwLock::new(flags),
        }
    }

    fn lookup(&self, flag: &str, tenant_id: &str) -> Option<FlagValue> {
        let flags = self.flags.read().ok()?;
        if let Some(overrides) = flags.tenant_overrides.get(tenant_id)
            && let Some(value) = overrides.get(flag)
        {
            return Some(value.clone());
        }
        flags.defaults.get(flag).cloned()
    }
}

impl FlagProvider for StaticFlagProvider {
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn is_enabled(&self, flag: &str, tenant_id: &str) -> bool {
        self.lookup(flag, tenant_id)
            .is_some_and(|value| value.as_bool())
    }

    fn value(&self, flag: &str, tenant_id: &str) -> Option<FlagValue> {
        self.lookup(flag, tenant_id)
    }

    fn all_flags(&self, tenant_id: &str) -> BTreeMap<String, FlagValue> {
        let Ok(flags) = self.flags.read() else {
            return BTreeMap::new();
        };
        let mut evaluated = flags.defaults.clone();
        if let Some(overrides) = flags.tenant_overrides.get(tenant_id) {
            for (name, value) in overrides {
                evaluated.insert(name.clone(), value.clone());
            }
        }
        evaluated
    }

    fn refresh(&self) -> Result<()> {
        Ok(())
    }
}
