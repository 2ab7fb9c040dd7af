use clap::{Arg, ArgAction, Command};

/// CSRF protocol arguments.
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("csrf-header")
                .long("csrf-header")
                .help("Header carrying CSRF tokens in both directions")
                .default_value("x-csrf-token")
                .env("PORTICO_CSRF_HEADER"),
        )
        .arg(
            Arg::new("csrf-cookie-prefix")
                .long("csrf-cookie-prefix")
                .help("Prefix for the csrf-secret/csrf-iat cookie names")
                .default_value("")
                .env("PORTICO_CSRF_COOKIE_PREFIX"),
        )
        .arg(
            Arg::new("csrf-secret-bytes")
                .long("csrf-secret-bytes")
                .help("Secret length in bytes")
                .default_value("32")
                .env("PORTICO_CSRF_SECRET_BYTES")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("csrf-salt-bytes")
                .long("csrf-salt-bytes")
                .help("Token salt length in bytes")
                .default_value("16")
                .env("PORTICO_CSRF_SALT_BYTES")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("csrf-rotate-ms")
                .long("csrf-rotate-ms")
                .help("Secret age in milliseconds after which safe requests rotate it")
                .default_value("86400000")
                .env("PORTICO_CSRF_ROTATE_MS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("csrf-protected-paths")
                .long("csrf-protected-paths")
                .help("Comma-separated path prefixes the protocol protects")
                .default_value("/api")
                .env("PORTICO_CSRF_PROTECTED_PATHS")
                .value_delimiter(','),
        )
        .arg(
            Arg::new("insecure-cookies")
                .long("insecure-cookies")
                .help("Omit the Secure cookie attribute (local development over http)")
                .env("PORTICO_INSECURE_COOKIES")
                .action(ArgAction::SetTrue),
        )
}
