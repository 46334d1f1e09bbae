use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, one line per event.
    Compact,
    /// One JSON object per event, for log shippers.
    Json,
}

/// `RUST_LOG` wins when set.
fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose {
        "sales_dashboard=debug,info"
    } else {
        "sales_dashboard=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean for
/// the summary. A second call is ignored.
pub fn init_logger(format: LogFormat, verbose: bool) {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(env_filter(verbose));

    let installed = match format {
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
    };
    if installed.is_err() {
        tracing::debug!("Logger already initialized");
    }
}

pub fn init_cli_logger(verbose: bool) {
    init_logger(LogFormat::Compact, verbose);
}

pub fn init_json_logger(verbose: bool) {
    init_logger(LogFormat::Json, verbose);
}
