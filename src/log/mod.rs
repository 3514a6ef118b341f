//! Logging setup shared by the command-line tools.
//!
//! The library itself only uses the `log` facade; binaries pick the sink.

/// Initialise `env_logger` on stderr, defaulting to `info` unless `RUST_LOG` is set.
pub fn init() {
    init_with_default("info");
}

/// Like [`init`], with a caller-chosen default filter. Repeated calls are ignored.
pub fn init_with_default(default_filter: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init();
}
