//! Logging configuration and utilities for EventDesk
//!
//! This module configures the `tracing-subscriber` fmt layer used by the
//! binaries and provides helpers that keep TOTP secrets out of log output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Once, OnceLock};
use tracing_subscriber::{fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// One-time initialization flag for logging
static INIT: Once = Once::new();

/// Logging configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub target: LogTarget,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            target: LogTarget::Stderr,
            format: LogFormat::Compact,
        }
    }
}

/// Log levels supported by the logging system
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `EnvFilter`
    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directive())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    /// Accepts the directive names case-insensitively, plus `warning`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.trim().to_ascii_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            other => {
                return Err(format!(
                    "unknown log level '{other}' (expected error, warn, info, debug or trace)"
                ))
            }
        };
        Ok(level)
    }
}

/// Log output targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    Stderr,
    Stdout,
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact format: LEVEL message
    Compact,
    /// Full format: timestamp LEVEL target: message
    Full,
}

/// Initialize logging with the given configuration
///
/// Should be called once at application startup; subsequent calls are
/// ignored. `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.directive()));

        let registry = tracing_subscriber::registry().with(filter);

        // try_init so an embedding application's subscriber wins
        let result = match (config.format, config.target) {
            (LogFormat::Compact, LogTarget::Stderr) => registry
                .with(tracing_fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
                .try_init(),
            (LogFormat::Compact, LogTarget::Stdout) => registry
                .with(tracing_fmt::layer().compact().with_target(false).with_writer(std::io::stdout))
                .try_init(),
            (LogFormat::Full, LogTarget::Stderr) => registry
                .with(tracing_fmt::layer().with_thread_ids(true).with_writer(std::io::stderr))
                .try_init(),
            (LogFormat::Full, LogTarget::Stdout) => registry
                .with(tracing_fmt::layer().with_thread_ids(true).with_writer(std::io::stdout))
                .try_init(),
        };

        if let Err(e) = result {
            tracing::debug!("Logging already initialized: {}", e);
        }
    });
}

/// Check if logging has been initialized
pub fn is_logging_initialized() -> bool {
    INIT.is_completed()
}

fn sensitive_patterns() -> &'static [(regex::Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(regex::Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // otpauth query parameter, stops at the next parameter
            (r"(?i)secret=[^&\s]+", "secret=***"),
            (r"(?i)secret[:\s]+[^\s]+", "secret=***"),
            (r"(?i)password[=:\s]+[^\s]+", "password=***"),
            (r"(?i)token[=:\s]+[^\s]+", "token=***"),
            (r"(?i)code[=:\s]+\d{6,8}\b", "code=***"),
        ]
        .into_iter()
        .filter_map(|(pattern, replacement)| {
            regex::Regex::new(pattern).ok().map(|re| (re, replacement))
        })
        .collect()
    })
}

/// Helper function to sanitize log messages by removing sensitive data
pub fn sanitize_log_message(message: &str) -> String {
    let mut sanitized = message.to_string();

    for (re, replacement) in sensitive_patterns() {
        sanitized = re.replace_all(&sanitized, *replacement).to_string();
    }

    sanitized
}
