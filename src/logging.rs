use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map the `-v` count to a default filter directive.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize tracing to stderr.
///
/// `RUST_LOG` takes precedence over the verbosity flag. Stdout is left
/// alone so JSON output can be piped.
pub fn init_tracing(verbosity: u8, use_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(use_color)
        .without_time()
        .compact();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    // A second init (tests driving `run` twice) is not an error for us.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();

    tracing::debug!(target: "system", "Tracing initialized at {}", default_directive(verbosity));
}

/// Convenience macros for common operations
#[macro_export]
macro_rules! trace_request {
    ($method:expr, $url:expr) => {
        tracing::debug!(target: "http", "{} {}", $method, $url);
    };
}

#[macro_export]
macro_rules! trace_command {
    ($name:expr) => {
        tracing::info!(target: "command", "Running {}", $name);
    };
}
