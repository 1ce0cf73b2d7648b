use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Installs the global subscriber. Logs go to stderr; stdout is reserved
/// for the tool's actual output.
///
/// `RUST_LOG` overrides the filter and `LOG_FORMAT=json` switches to JSON lines.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // try_init: a second call (e.g. from tests) keeps the first subscriber.
    let _ = if json_logs {
        builder.with_target(false).json().try_init()
    } else {
        builder.try_init()
    };
}
