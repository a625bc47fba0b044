use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used when `RUST_LOG` is unset. `--verbose` lifts the
/// crate to debug and lets other crates log at info.
pub fn default_directive(config: &LoggingConfig, verbose: bool) -> String {
    if verbose {
        "thundermonit=debug,info".to_string()
    } else {
        format!("thundermonit={},warn", config.level)
    }
}

/// Installs the global subscriber: an `EnvFilter` plus a compact or JSON
/// fmt layer, chosen by the logging config.
pub fn init_logger(config: &LoggingConfig, verbose: bool) {
    // RUST_LOG wins over the config file
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config, verbose)));

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .json(),
            )
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_forces_debug() {
        let config = LoggingConfig::default();
        assert_eq!(default_directive(&config, true), "thundermonit=debug,info");
        assert_eq!(default_directive(&config, false), "thundermonit=info,warn");
    }
}
