use crate::{
    api::{self, AppContext},
    csrf::CsrfConfig,
    flags::{FlagSet, FlagValue, StaticFlagProvider},
    tenant::{InMemoryTenantProvider, TenantConfig, TenantRecord},
};
use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub tenant_config: TenantConfig,
    pub csrf_config: CsrfConfig,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    // Seeded demo data stands in for the tenant database and a remote flag
    // backend; both sit behind traits so real implementations swap in at
    // construction time.
    let tenants = Arc::new(InMemoryTenantProvider::with_records(seed_tenants()));
    let flags = Arc::new(StaticFlagProvider::new(seed_flags()));

    let ctx = AppContext::new(args.tenant_config, args.csrf_config, tenants, flags);

    api::new(args.port, ctx).await
}

fn seed_tenants() -> Vec<TenantRecord> {
    vec![
        TenantRecord::new("acme", "Acme Co"),
        TenantRecord::new("globex", "Globex Corporation"),
    ]
}

fn seed_flags() -> FlagSet {
    let mut defaults = BTreeMap::new();
    defaults.insert("new-dashboard".to_string(), FlagValue::Bool(false));
    defaults.insert("widget-quota".to_string(), FlagValue::Number(50.0));

    let mut acme = BTreeMap::new();
    acme.insert("new-dashboard".to_string(), FlagValue::Bool(true));

    let mut tenant_overrides = HashMap::new();
    tenant_overrides.insert("acme".to_string(), acme);

    FlagSet {
        defaults,
        tenant_overrides,
    }
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        (
            "multi_tenant",
            args.tenant_config.multi_tenant().to_string(),
        ),
        (
            "default_tenant",
            args.tenant_config.default_tenant_id().to_string(),
        ),
        ("tenant_header", args.tenant_config.header_name().to_string()),
        ("csrf_header", args.csrf_config.header_name().to_string()),
        (
            "csrf_rotate_ms",
            args.csrf_config.rotate_after_ms().to_string(),
        ),
        (
            "secure_cookies",
            args.csrf_config.secure_cookies().to_string(),
        ),
        (
            "base_url",
            args.csrf_config
                .app_url()
                .map_or_else(|| "none".to_string(), ToString::to_string),
        ),
    ];
    for (key, value) in entries {
        info!("{key}: {value}");
    }
}
