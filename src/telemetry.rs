use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "taskhub=debug,tower_http=info,sqlx=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

/// `prod` (or `LOG_FORMAT=json`) logs JSON, `dev`/`local` log pretty
/// multi-line output, anything else logs compact text.
pub fn format_for(env: &str, log_format: Option<&str>) -> LogFormat {
    if log_format == Some("json") {
        return LogFormat::Json;
    }
    match env {
        "prod" => LogFormat::Json,
        "dev" | "local" => LogFormat::Pretty,
        _ => LogFormat::Compact,
    }
}

pub fn init(env: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let log_format = std::env::var("LOG_FORMAT").ok();

    match format_for(env, log_format.as_deref()) {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .pretty()
            .init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .compact()
            .init(),
    }
}
