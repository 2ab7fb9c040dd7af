//! Immutable tenant-resolution configuration.

pub const DEFAULT_TENANT_HEADER: &str = "x-tenant-id";
pub const DEFAULT_TENANT_ID: &str = "default";

/// Resolved once at startup and injected into the resolver and middleware.
/// Business logic never reaches into the environment.
#[derive(Debug, Clone)]
pub struct TenantConfig {
    multi_tenant: bool,
    header_name: String,
    default_tenant_id: String,
}

impl TenantConfig {
    #[must_use]
    pub fn new(multi_tenant: bool, header_name: &str, default_tenant_id: &str) -> Self {
        Self {
            multi_tenant,
            // Header names are case-insensitive on the wire; store the
            // canonical lowercase form.
            header_name: header_name.to_ascii_lowercase(),
            default_tenant_id: default_tenant_id.to_string(),
        }
    }

    /// Whether requests may select a tenant at all. When `false`, every
    /// request resolves to the default tenant regardless of its contents.
    #[must_use]
    pub fn multi_tenant(&self) -> bool {
        self.multi_tenant
    }

    #[must_use]
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    #[must_use]
    pub fn default_tenant_id(&self) -> &str {
        &self.default_tenant_id
    }
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self::new(true, DEFAULT_TENANT_HEADER, DEFAULT_TENANT_ID)
    }
}
