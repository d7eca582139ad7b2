//! Two-factor authentication settings
//!
//! Defaults match what authenticator apps assume when a provisioning URI
//! omits parameters: SHA-1, 6 digits, 30 second period.

use serde::{Deserialize, Serialize};

use crate::error::{SharedError, SharedResult};
use crate::utils::secret::{DEFAULT_SECRET_BYTES, MIN_SECRET_BYTES};
use crate::utils::totp::{TotpParams, DEFAULT_DIGITS, DEFAULT_PERIOD, DEFAULT_WINDOW};

/// Largest verification window accepted (steps either side of now)
pub const MAX_WINDOW: u32 = 10;

/// TOTP settings used by the account security service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoFactorConfig {
    /// Service name shown in authenticator apps
    pub issuer: String,

    /// Time step in seconds
    pub period: u64,

    /// Number of code digits
    pub digits: u32,

    /// Steps accepted either side of the current one to absorb clock drift
    pub window: u32,

    /// Length of newly generated secrets in bytes
    pub secret_bytes: usize,
}

impl Default for TwoFactorConfig {
    fn default() -> Self {
        Self {
            issuer: "EventDesk".to_string(),
            period: DEFAULT_PERIOD,
            digits: DEFAULT_DIGITS,
            window: DEFAULT_WINDOW,
            secret_bytes: DEFAULT_SECRET_BYTES,
        }
    }
}

impl TwoFactorConfig {
    /// Verification parameters derived from this configuration
    pub fn params(&self) -> TotpParams {
        TotpParams::new(self.period, self.digits, self.window)
    }

    /// Validate the configuration
    pub fn validate(&self) -> SharedResult<()> {
        if self.issuer.trim().is_empty() {
            return Err(invalid("issuer", "must not be empty"));
        }

        if self.period == 0 {
            return Err(invalid("period", "must be greater than 0"));
        }

        if !(6..=8).contains(&self.digits) {
            return Err(invalid("digits", "must be between 6 and 8"));
        }

        if self.window > MAX_WINDOW {
            return Err(invalid(
                "window",
                &format!("must not exceed {MAX_WINDOW} steps"),
            ));
        }

        if self.secret_bytes < MIN_SECRET_BYTES {
            return Err(invalid(
                "secret_bytes",
                &format!("must be at least {MIN_SECRET_BYTES} bytes"),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> SharedError {
    SharedError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
