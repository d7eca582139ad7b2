//! EventDesk Shared Library
//!
//! This crate contains the two-factor authentication engine used by the
//! EventDesk admin console, together with the account security workflow that
//! enrolls administrators and checks their codes at login.
//!
//! # Features
//!
//! - **Base32**: RFC 4648 codec with lenient decoding for user-typed secrets
//! - **TOTP**: RFC 6238 code generation and windowed verification
//! - **Provisioning**: `otpauth://` URIs for authenticator apps
//! - **Account security**: setup / enable / verify login / disable over a
//!   pluggable record store
//!
//! # Usage
//!
//! ```rust
//! use eventdesk_shared::{AccountSecurity, MemoryTwoFactorStore, TwoFactorConfig};
//!
//! let security = AccountSecurity::new(MemoryTwoFactorStore::new(), TwoFactorConfig::default());
//!
//! // Start enrollment: show the secret / QR code to the user
//! let enrollment = security.setup("admin@example.com").unwrap();
//! assert!(enrollment.provisioning_uri.starts_with("otpauth://totp/EventDesk:"));
//!
//! // Nothing is required at login until enrollment is confirmed
//! assert!(!security.is_enabled("admin@example.com").unwrap());
//! ```

pub mod account;
pub mod config;
pub mod core;
pub mod logging;
pub mod utils;

// Re-export commonly used types for convenience
pub use account::{AccountSecurity, Enrollment};
pub use config::TwoFactorConfig;
pub use crate::core::{
    FixedClock, MemoryTwoFactorStore, SystemClock, TimeSource, TwoFactorRecord, TwoFactorStore,
};
pub use utils::*;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types used throughout the library
pub mod error {
    use thiserror::Error;

    /// Common error type for shared library operations
    #[derive(Error, Debug)]
    pub enum SharedError {
        #[error("Random source failure: {message}")]
        RandomSource { message: String },

        #[error("Invalid configuration: {field} - {reason}")]
        InvalidConfig { field: String, reason: String },

        #[error("Two-factor authentication is not enabled for account: {account}")]
        NotEnrolled { account: String },

        #[error("Record store error: {message}")]
        Store { message: String },

        #[error("Serialization error: {0}")]
        Serialization(#[from] serde_json::Error),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
    }

    /// Result type alias for shared library operations
    pub type SharedResult<T> = Result<T, SharedError>;
}

pub use error::{SharedError, SharedResult};
