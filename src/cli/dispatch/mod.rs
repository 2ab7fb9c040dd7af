use crate::cli::actions::{Action, server::Args};
use crate::csrf::CsrfConfig;
use crate::tenant::{TenantConfig, is_valid_tenant_id};
use anyhow::{Context, Result, ensure};
use url::Url;

/// Turn parsed arguments into an [`Action`], building the immutable
/// configuration structs the server injects everywhere.
///
/// # Errors
///
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let base_url = matches
        .get_one::<String>("base-url")
        .map(|raw| Url::parse(raw).context("invalid PORTICO_BASE_URL"))
        .transpose()?;

    let default_tenant = matches
        .get_one::<String>("default-tenant")
        .cloned()
        .context("missing argument: --default-tenant")?;
    ensure!(
        is_valid_tenant_id(&default_tenant),
        "invalid default tenant id: {default_tenant:?}"
    );

    let tenant_header = matches
        .get_one::<String>("tenant-header")
        .cloned()
        .context("missing argument: --tenant-header")?;
    let single_tenant = matches.get_flag("single-tenant");

    let tenant_config = TenantConfig::new(!single_tenant, &tenant_header, &default_tenant);

    let protected_paths: Vec<String> = matches
        .get_many::<String>("csrf-protected-paths")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let csrf_config = CsrfConfig::default()
        .with_header_name(
            matches
                .get_one::<String>("csrf-header")
                .map_or("x-csrf-token", String::as_str),
        )
        .with_cookie_prefix(
            matches
                .get_one::<String>("csrf-cookie-prefix")
                .map_or("", String::as_str),
        )
        .with_secret_len(
            matches
                .get_one::<usize>("csrf-secret-bytes")
                .copied()
                .unwrap_or(32),
        )
        .with_salt_len(
            matches
                .get_one::<usize>("csrf-salt-bytes")
                .copied()
                .unwrap_or(16),
        )
        .with_rotate_after_ms(
            matches
                .get_one::<u64>("csrf-rotate-ms")
                .copied()
                .unwrap_or(86_400_000),
        )
        .with_secure_cookies(!matches.get_flag("insecure-cookies"))
        .with_protected_paths(protected_paths)
        .with_app_url(base_url);

    Ok(Action::Server(Args {
        port,
        tenant_config,
        csrf_config,
    }))
}
