//! Utility modules for EventDesk
//!
//! This module provides the building blocks of the two-factor engine: the
//! Base32 codec, TOTP generation and verification, secret generation and
//! provisioning URI formatting.

pub mod base32;
pub mod provisioning;
pub mod secret;
pub mod totp;

// Re-export commonly used items for convenience
pub use provisioning::provisioning_uri;
pub use secret::{generate_base32_secret, generate_secret};
pub use totp::{generate_code, verify, verify_at, TotpParams};
