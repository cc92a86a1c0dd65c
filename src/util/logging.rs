//! Structured logging setup for cookbox
//!
//! Library code only emits `tracing` events. The binary installs a
//! subscriber once, at startup, with one of the configurations below.
//!
//! # Example
//!
//! ```no_run
//! use cookbox::util::logging;
//!
//! // COOKBOX_LOG_LEVEL=debug COOKBOX_LOG_JSON=true
//! logging::init_from_env();
//!
//! tracing::info!(recipe_id = "0f8fad5b", "Recipe creation started");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "COOKBOX_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "COOKBOX_LOG_JSON";

/// Transport crates that are capped at `warn` unless `RUST_LOG` says otherwise
const NOISY_CRATES: [&str; 3] = ["h2", "hyper", "reqwest"];

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for events emitted by this crate
    pub level: Level,

    /// Emit one JSON object per event
    pub use_json: bool,

    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    /// Include thread ID and name, useful when parallel steps interleave
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
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with full metadata, for log shippers
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: true,
        }
    }

    /// Build the event filter for this configuration.
    ///
    /// `RUST_LOG` directives are honoured first; the crate level is added on
    /// top, and transport crates are only quietened when `RUST_LOG` is unset.
    pub fn filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::from_default_env()
            .add_directive(crate_directive(&format!("cookbox={}", self.level)));

        if env::var("RUST_LOG").is_err() {
            for name in NOISY_CRATES {
                filter = filter.add_directive(crate_directive(&format!("{}=warn", name)));
            }
        }
        filter
    }
}

fn crate_directive(directive: &str) -> Directive {
    // Every directive built here is `name=level` with a known level
    directive
        .parse()
        .unwrap_or_else(|_| Directive::from(Level::INFO))
}

/// Strict level parsing, used for configuration validation
pub fn try_parse_level(level_str: &str) -> Option<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Lenient level parsing: unknown levels fall back to INFO
pub fn parse_level(level_str: &str) -> Level {
    try_parse_level(level_str).unwrap_or_else(|| {
        eprintln!(
            "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
            level_str
        );
        Level::INFO
    })
}

/// Level selected by the `-v` / `-q` command line flags.
///
/// An explicit level wins over both flags.
pub fn level_from_flags(explicit: Option<&str>, verbose: u8, quiet: bool) -> Level {
    if let Some(level) = explicit {
        return parse_level(level);
    }
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber.
///
/// Only the first call has any effect. If another subscriber is already
/// installed (e.g. by a test harness), this leaves it in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.filter();

        let result = if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .try_init()
        };

        if let Err(e) = result {
            eprintln!("Logging already initialised: {}", e);
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Configure from `COOKBOX_LOG_LEVEL` and `COOKBOX_LOG_JSON`
pub fn init_from_env() {
    init_logging(config_from_env());
}

pub fn config_from_env() -> LoggingConfig {
    let level = env::var(LOG_LEVEL_ENV)
        .map(|v| parse_level(&v))
        .unwrap_or(Level::INFO);

    let use_json = env::var(LOG_JSON_ENV)
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    LoggingConfig {
        level,
        use_json,
        ..Default::default()
    }
}
