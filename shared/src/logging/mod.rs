//! Logging infrastructure for EventDesk
//!
//! Structured logging goes through `tracing`. This module sets up the
//! subscriber and provides utilities for secure logging that avoids exposing
//! shared secrets or one-time codes.

pub mod logger;

// Re-export commonly used items
pub use logger::{
    init_logging, is_logging_initialized, sanitize_log_message, LogFormat, LogLevel, LogTarget,
    LoggingConfig,
};

