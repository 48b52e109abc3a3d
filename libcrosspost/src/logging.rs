//! Logging setup
//!
//! Everything logs to stderr through `tracing`. `CROSSPOST_LOG_FORMAT`
//! selects text, json, or pretty output and `CROSSPOST_LOG_LEVEL` the
//! default level; a `RUST_LOG` filter expression still takes precedence
//! for per-module filtering. Passing `verbose: true` (the server's
//! `--verbose` flag) forces debug-level output over all of them.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

const FORMAT_VAR: &str = "CROSSPOST_LOG_FORMAT";
const LEVEL_VAR: &str = "CROSSPOST_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain text, no targets (the default)
    Text,
    /// One JSON object per line with flattened event fields
    Json,
    /// Multi-line pretty output for development
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

/// Resolve format and level from the environment values and the verbose
/// flag. Verbose wins over any configured level; an unparseable format
/// falls back to text.
fn resolve(format: Option<String>, level: Option<String>, verbose: bool) -> (LogFormat, String) {
    let format = format
        .and_then(|s| s.parse().ok())
        .unwrap_or(LogFormat::Text);
    let level = if verbose {
        "debug".to_string()
    } else {
        level.unwrap_or_else(|| "info".to_string())
    };
    (format, level)
}

/// Install the global subscriber.
///
/// # Panics
///
/// Panics if a subscriber has already been installed.
pub fn init(verbose: bool) {
    let (format, level) = resolve(
        std::env::var(FORMAT_VAR).ok(),
        std::env::var(LEVEL_VAR).ok(),
        verbose,
    );
    let filter = if verbose {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Text => builder.with_target(false).init(),
    }
}
