//! Structured logging setup
//!
//! Installs a `tracing` subscriber writing to stderr, so stdout stays free for
//! dependency lists and compiler output. `RUST_LOG`, when set, takes precedence
//! over the configured level.
//!
//! # Example
//!
//! ```no_run
//! use nsbuild::util::{init_logging, LoggingConfig};
//! use tracing::Level;
//!
//! init_logging(LoggingConfig {
//!     level: Level::DEBUG,
//!     ..LoggingConfig::from_env()
//! });
//! tracing::debug!(root = "/srv/js", "Scanning");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for nsbuild's own events
    pub level: Level,

    /// JSON lines instead of human-readable output
    pub use_json: bool,

    /// Include the module target (e.g. `nsbuild::resolve`)
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    /// Reads `NSBUILD_LOG_LEVEL` and `NSBUILD_LOG_JSON`
    pub fn from_env() -> Self {
        let level_str = env::var("NSBUILD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let use_json = env::var("NSBUILD_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level: parse_level(&level_str),
            use_json,
            include_location: use_json,
            include_thread_ids: use_json,
            ..Default::default()
        }
    }
}

/// Parses a level name case-insensitively, falling back to INFO
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber; later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("nsbuild={}", config.level)));

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_thread_ids(config.include_thread_ids)
            .with_thread_names(config.include_thread_ids);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init();
        } else {
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("Debug"), Level::DEBUG);
        assert_eq!(parse_level(" WARN "), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
    }

    #[test]
    fn test_parse_level_invalid() {
        assert_eq!(parse_level("loud"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
        assert!(config.include_target);
        assert!(!config.include_location);
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        env::set_var("NSBUILD_LOG_LEVEL", "debug");
        env::set_var("NSBUILD_LOG_JSON", "true");

        let config = LoggingConfig::from_env();

        env::remove_var("NSBUILD_LOG_LEVEL");
        env::remove_var("NSBUILD_LOG_JSON");

        assert_eq!(config.level, Level::DEBUG);
        assert!(config.use_json);
        assert!(config.include_location);
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        env::remove_var("NSBUILD_LOG_LEVEL");
        env::remove_var("NSBUILD_LOG_JSON");

        let config = LoggingConfig::from_env();

        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
    }
}
