//! Tenant record lookup behind a capability interface.
//!
//! Persistence is out of scope for this service; records live in memory and
//! are seeded at startup. The trait is the seam where a database-backed
//! implementation would slot in.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

/// A known tenant. The slug is the identifier the resolver produces.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TenantRecord {
    pub id: Uuid,
    pub slug: String,
    pub display_name: String,
    pub active: bool,
}

impl TenantRecord {
    #[must_use]
    pub fn new(slug: &str, display_name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            display_name: display_name.to_string(),
            active: true,
        }
    }
}

/// Lookup interface consumed by handlers that need tenant metadata.
pub trait TenantProvider: Send + Sync {
    /// Fetch a record by slug. `None` means the tenant is unknown.
    fn fetch(&self, slug: &str) -> Option<TenantRecord>;

    /// All known records, unordered.
    fn all(&self) -> Vec<TenantRecord>;
}

/// In-memory provider keyed by slug.
#[derive(Debug, Default)]
pub struct InMemoryTenantProvider {
    records: RwLock<HashMap<String, TenantRecord>>,
}

impl InMemoryTenantProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with a set of records, replacing any existing entries with the
    /// same slug.
    #[must_use]
    pub fn with_records(records: Vec<TenantRecord>) -> Self {
        let provider = Self::new();
        for record in records {
            provider.upsert(record);
        }
        provider
    }

    pub fn upsert(&self, record: TenantRecord) {
        if let Ok(mut records) = self.records.write() {
            records.insert(record.slug.clone(), record);
        }
    }
}

impl TenantProvider for InMemoryTenantProvider {
    fn fetch(&self, slug: &str) -> Option<TenantRecord> {
        self.records
            .read()
            .ok()
            .and_then(|records| records.get(slug).cloned())
    }

    fn all(&self) -> Vec<TenantRecord> {
        self.records
            .read()
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_returns_seeded_record() {
        let provider =
            InMemoryTenantProvider::with_records(vec![TenantRecord::new("acme", "Acme Co")]);

        let record = provider.fetch("acme").expect("record");
        assert_eq!(record.slug, "acme");
        assert_eq!(record.display_name, "Acme Co");
        assert!(record.active);
    }

    #[test]
    fn fetch_unknown_is_none() {
        let provider = InMemoryTenantProvider::new();
        assert!(provider.fetch("ghost").is_none());
    }

    #[test]
    fn upsert_replaces_by_slug() {
        let provider =
            InMemoryTenantProvider::with_records(vec![TenantRecord::new("acme", "Acme Co")]);
        let mut replacement = TenantRecord::new("acme", "Acme Corporation");
        replacement.active = false;
        provider.upsert(replacement);

        let record = provider.fetch("acme").expect("record");
        assert_eq!(record.display_name, "Acme Corporation");
        assert!(!record.active);
        assert_eq!(provider.all().len(), 1);
    }
}
