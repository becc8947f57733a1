//! Logging setup for strata binaries.
//!
//! Console output with an uptime timer, filtered by `RUST_LOG` or the
//! configured level. Debug builds can also write JSON lines to `strata.log`.
//! Records emitted through the `log` facade are forwarded to the same
//! subscriber.

use std::fs::File;
use std::path::Path;

use strata_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_FILTER: &str = "info";

/// File name of the JSON log inside `log_dir`.
pub const LOG_FILE: &str = "strata.log";

/// Installs the global subscriber. Call once, early in `main`.
///
/// The file layer is added only when `debug_build` is set and `log_dir` can
/// be created. Failing that, logging silently falls back to console only.
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build && let Some(log_file) = log_dir.and_then(open_log_file) {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// The configured level, or [`DEFAULT_FILTER`] when it is blank.
pub fn filter_directive(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.clone()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

fn open_log_file(dir: &Path) -> Option<File> {
    std::fs::create_dir_all(dir).ok()?;
    File::create(dir.join(LOG_FILE)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(filter_directive(None), "info");

        let mut config = Config::default();
        config.debug.log_level = "  ".into();
        assert_eq!(filter_directive(Some(&config)), "info");
    }

    #[test]
    fn test_configured_filter() {
        let mut config = Config::default();
        config.debug.log_level = "warn,strata_world=debug".into();
        let directive = filter_directive(Some(&config));
        assert_eq!(directive, "warn,strata_world=debug");
        assert!(EnvFilter::try_new(&directive).is_ok());
    }

    #[test]
    fn test_env_filter_parsing() {
        for directive in ["info", "debug,strata_terrain=trace", "error"] {
            assert!(
                EnvFilter::try_new(directive).is_ok(),
                "failed to parse {directive}"
            );
        }
    }

    #[test]
    fn test_log_file_created() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        assert!(open_log_file(&logs).is_some());
        assert!(logs.join(LOG_FILE).exists());
    }
}
