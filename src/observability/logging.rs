//! Logging initialization for `netscen`.
//!
//! The library only emits `tracing` events: one `debug!` per loader stage,
//! an `info!` per loaded scenario and a `warn!` per validation warning.
//! An embedding engine (or a test) installs a subscriber by calling
//! [`init_logging`] once.

use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the default filter.
pub const LOG_LEVEL_ENV: &str = "NETSCEN_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON for machine consumption.
    Json,
}

/// Color output choice for human-readable logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Color when stderr is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Builds the default filter: the engine's own crates stay at `warn`
/// while loader events pass at `level`.
#[must_use]
pub fn default_directive(level: Level) -> String {
    format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level.as_str().to_lowercase())
}

/// Initializes the global tracing subscriber on stderr.
///
/// `NETSCEN_LOG_LEVEL`, when set, replaces the default filter entirely.
/// Only the first call installs a subscriber.
pub fn init_logging(format: LogFormat, level: Level, color: ColorChoice) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    match format {
        LogFormat::Human => {
            let use_ansi = match color {
                ColorChoice::Auto => {
                    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
                }
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            };
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr)
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_current_span(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
