use std::io;

use tracing_subscriber::{fmt, EnvFilter};

pub(crate) const LOG_ENV: &str = "ENVSYNC_LOG";

/// Filter directive for the stderr subscriber. `-v` flags win over `ENVSYNC_LOG`.
pub(crate) fn log_filter_directive(verbosity: u8, env_value: Option<&str>) -> String {
    let from_flags = match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    };
    if let Some(level) = from_flags {
        return level.to_string();
    }
    env_value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("warn")
        .to_string()
}

pub(crate) fn init_tracing(verbosity: u8) {
    let env_value = std::env::var(LOG_ENV).ok();
    let directive = log_filter_directive(verbosity, env_value.as_deref());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
