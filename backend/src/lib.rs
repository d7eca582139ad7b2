//! EventDesk Backend Library
//!
//! This module exposes the operator CLI functionality as a library so it can
//! be used by tests.

pub mod commands;
pub mod config;
pub mod error;
pub mod storage;

// Re-export commonly used types
pub use commands::{execute, Command, Outcome};
pub use config::Config;
pub use error::{BackendError, BackendResult};
pub use storage::JsonFileStore;
