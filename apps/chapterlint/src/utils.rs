//! Console helpers shared by the binary.

use owo_colors::OwoColorize;

/// True when stdout may be colorized (`NO_COLOR` unset).
pub fn use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if use_colors() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if use_colors() {
        "note:".yellow().bold().to_string()
    } else {
        "note:".to_string()
    }
}

pub fn info_prefix() -> String {
    if use_colors() {
        "info:".cyan().bold().to_string()
    } else {
        "info:".to_string()
    }
}

/// Install the stderr `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug` and the
/// default is `warn`.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
