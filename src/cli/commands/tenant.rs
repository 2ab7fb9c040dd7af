use clap::{Arg, ArgAction, Command};

/// Tenant-resolution arguments.
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("tenant-header")
                .long("tenant-header")
                .help("Request header carrying an explicit tenant id")
                .default_value("x-tenant-id")
                .env("PORTICO_TENANT_HEADER"),
        )
        .arg(
            Arg::new("default-tenant")
                .long("default-tenant")
                .help("Tenant id used when no strategy resolves one")
                .default_value("default")
                .env("PORTICO_DEFAULT_TENANT"),
        )
        .arg(
            Arg::new("single-tenant")
                .long("single-tenant")
                .help("Disable multi-tenancy; every request resolves to the default tenant")
                .env("PORTICO_SINGLE_TENANT")
                .action(ArgAction::SetTrue),
        )
}
