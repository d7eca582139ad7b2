//! Two-factor record persistence interface
//!
//! The engine never decides where enrollment state lives. Whatever owns user
//! records (a JSON file, a database, memory in tests) implements
//! [`TwoFactorStore`] and the account security service calls through it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SharedResult;

/// Persisted two-factor state for one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoFactorRecord {
    /// Whether the second factor is required at login
    pub enabled: bool,

    /// Base32 text form of the shared secret
    pub secret: String,

    /// When enrollment was confirmed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_at: Option<DateTime<Utc>>,
}

impl TwoFactorRecord {
    /// Record for a freshly confirmed enrollment
    pub fn enabled(secret: impl Into<String>, enabled_at: DateTime<Utc>) -> Self {
        Self {
            enabled: true,
            secret: secret.into(),
            enabled_at: Some(enabled_at),
        }
    }
}

/// Storage backend for two-factor records, keyed by account name
pub trait TwoFactorStore: Send + Sync {
    /// Load the record for an account, if any
    fn load(&self, account: &str) -> SharedResult<Option<TwoFactorRecord>>;

    /// Insert or replace the record for an account
    fn save(&self, account: &str, record: TwoFactorRecord) -> SharedResult<()>;

    /// Remove the record for an account, returning whether one existed
    fn remove(&self, account: &str) -> SharedResult<bool>;
}

impl<S: TwoFactorStore + ?Sized> TwoFactorStore for std::sync::Arc<S> {
    fn load(&self, account: &str) -> SharedResult<Option<TwoFactorRecord>> {
        (**self).load(account)
    }

    fn save(&self, account: &str, record: TwoFactorRecord) -> SharedResult<()> {
        (**self).save(account, record)
    }

    fn remove(&self, account: &str) -> SharedResult<bool> {
        (**self).remove(account)
    }
}
