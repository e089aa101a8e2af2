use std::collections::HashMap;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use super::{ConfigError, TenantConfig};

/// Immutable set of named tenants, built once at startup and shared by every
/// request handler.
#[derive(Debug, Clone, Default)]
pub struct TenantRegistry {
    tenants: HashMap<String, TenantConfig>,
}

impl TenantRegistry {
    /// Builds a registry from already-parsed tenants. One invalid tenant
    /// rejects the whole set.
    pub fn new(tenants: HashMap<String, TenantConfig>) -> Result<Self, ConfigError> {
        let mut names: Vec<&String> = tenants.keys().collect();
        names.sort();

        for name in names {
            let tenant = &tenants[name];

            if tenant.from_address.is_empty() {
                return Err(ConfigError::MissingSender {
                    tenant: name.clone(),
                });
            }

            if !tenant.requires_secret() && tenant.fixed_recipient().is_none() {
                return Err(ConfigError::OpenRelay {
                    tenant: name.clone(),
                });
            }

            debug!(
                tenant = %name,
                requires_secret = tenant.requires_secret(),
                fixed_recipient = tenant.fixed_recipient().unwrap_or("-"),
                secure_body = tenant.secure_body,
                "Tenant validated"
            );
        }

        Ok(Self { tenants })
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let tenants: HashMap<String, TenantConfig> = serde_json::from_str(contents)?;
        Self::new(tenants)
    }

    pub async fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).await?;
        let registry = Self::from_json(&contents)?;
        info!(
            "Loaded {} tenant(s) from {:?}",
            registry.len(),
            path
        );
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&TenantConfig> {
        self.tenants.get(name)
    }

    /// Tenant names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tenants.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TenantConfig)> {
        self.tenants.iter().map(|(name, tenant)| (name.as_str(), tenant))
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}
