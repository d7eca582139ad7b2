//! Account security: two-factor enrollment and login verification
//!
//! [`AccountSecurity`] is what login and profile handlers talk to. It drives
//! the TOTP engine and persists enrollment state through a
//! [`TwoFactorStore`]:
//!
//! 1. `setup` hands a new secret and provisioning URI to the user. Nothing is
//!    stored yet; the caller keeps the secret with the pending session.
//! 2. `enable` confirms the user's first code and persists the secret.
//! 3. `verify_login` checks a code on every later login.
//! 4. `disable` forgets the stored secret.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::TwoFactorConfig;
use crate::core::clock::{SystemClock, TimeSource};
use crate::core::store::{TwoFactorRecord, TwoFactorStore};
use crate::error::{SharedError, SharedResult};
use crate::utils::{base32, provisioning, secret, totp};

/// Secret and provisioning URI handed to a user starting enrollment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Base32 text secret, for manual entry
    pub secret: String,

    /// `otpauth://` URI, usually rendered as a QR code
    pub provisioning_uri: String,
}

/// Two-factor workflow over a record store
#[derive(Debug)]
pub struct AccountSecurity<S: TwoFactorStore, C: TimeSource = SystemClock> {
    store: S,
    clock: C,
    config: TwoFactorConfig,
}

impl<S: TwoFactorStore> AccountSecurity<S, SystemClock> {
    /// Create a service reading the wall clock
    pub fn new(store: S, config: TwoFactorConfig) -> Self {
        Self::with_clock(store, SystemClock, config)
    }
}

impl<S: TwoFactorStore, C: TimeSource> AccountSecurity<S, C> {
    /// Create a service with an explicit time source
    pub fn with_clock(store: S, clock: C, config: TwoFactorConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &TwoFactorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start enrollment for an account
    pub fn setup(&self, account: &str) -> SharedResult<Enrollment> {
        let secret = secret::generate_base32_secret_with_len(self.config.secret_bytes)?;
        // Advertise exactly the parameters verification will use
        let params = self.config.params();
        let provisioning_uri = provisioning::provisioning_uri(
            &self.config.issuer,
            account,
            &secret,
            params.period(),
            params.digits(),
        );

        debug!("Generated two-factor enrollment for account {}", account);
        Ok(Enrollment {
            secret,
            provisioning_uri,
        })
    }

    /// Confirm enrollment with the first code from the user's app
    ///
    /// On success the record `{ enabled: true, secret }` is saved and `true`
    /// returned. A wrong code stores nothing and returns `false`.
    pub fn enable(&self, account: &str, secret_b32: &str, code: &str) -> SharedResult<bool> {
        if !base32::is_valid(secret_b32) {
            warn!("Rejected two-factor enrollment for {}: malformed secret", account);
            return Ok(false);
        }

        let now = self.clock.now_unix();
        let Some(offset) = totp::matching_offset(secret_b32, code, now, &self.config.params())
        else {
            info!("Two-factor enrollment for {} failed: invalid code", account);
            return Ok(false);
        };

        let secret = base32::normalize_secret(secret_b32);
        let record = TwoFactorRecord::enabled(secret, timestamp(now));
        self.store.save(account, record)?;

        info!(
            "Two-factor authentication enabled for {} (step offset {})",
            account, offset
        );
        Ok(true)
    }

    /// Verify a login code for an enrolled account
    ///
    /// Fails with [`SharedError::NotEnrolled`] when the account has no
    /// enabled record; callers should only ask for a code when
    /// [`is_enabled`](Self::is_enabled) is true.
    pub fn verify_login(&self, account: &str, code: &str) -> SharedResult<bool> {
        let record = self
            .store
            .load(account)?
            .filter(|r| r.enabled)
            .ok_or_else(|| SharedError::NotEnrolled {
                account: account.to_string(),
            })?;

        let now = self.clock.now_unix();
        match totp::matching_offset(&record.secret, code, now, &self.config.params()) {
            Some(offset) => {
                debug!("Login code accepted for {} (step offset {})", account, offset);
                Ok(true)
            }
            None => {
                info!("Login code rejected for {}", account);
                Ok(false)
            }
        }
    }

    /// Remove the stored secret; returns whether the account was enrolled
    pub fn disable(&self, account: &str) -> SharedResult<bool> {
        let removed = self.store.remove(account)?;
        if removed {
            info!("Two-factor authentication disabled for {}", account);
        }
        Ok(removed)
    }

    /// Whether the account must present a code at login
    pub fn is_enabled(&self, account: &str) -> SharedResult<bool> {
        Ok(self
            .store
            .load(account)?
            .map(|r| r.enabled)
            .unwrap_or(false))
    }
}

fn timestamp(unix: u64) -> DateTime<Utc> {
    i64::try_from(unix)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now)
}
