//! In-memory two-factor record store
//!
//! Used by tests and by callers that keep user state elsewhere and only need
//! a scratch store for the duration of a process.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::core::store::{TwoFactorRecord, TwoFactorStore};
use crate::error::{SharedError, SharedResult};

/// Thread-safe map of account name to record
#[derive(Debug, Default)]
pub struct MemoryTwoFactorStore {
    records: RwLock<HashMap<String, TwoFactorRecord>>,
}

impl MemoryTwoFactorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> SharedError {
    SharedError::Store {
        message: "memory store lock poisoned".to_string(),
    }
}

impl TwoFactorStore for MemoryTwoFactorStore {
    fn load(&self, account: &str) -> SharedResult<Option<TwoFactorRecord>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(account).cloned())
    }

    fn save(&self, account: &str, record: TwoFactorRecord) -> SharedResult<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.insert(account.to_string(), record);
        Ok(())
    }

    fn remove(&self, account: &str) -> SharedResult<bool> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        Ok(records.remove(account).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_save_load_remove() {
        let store = MemoryTwoFactorStore::new();
        assert!(store.is_empty());
        assert_eq!(store.load("admin").unwrap(), None);

        let record = TwoFactorRecord::enabled("JBSWY3DPEHPK3PXP", Utc::now());
        store.save("admin", record.clone()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load("admin").unwrap(), Some(record));

        assert!(store.remove("admin").unwrap());
        assert!(!store.remove("admin").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_replaces_existing_record() {
        let store = MemoryTwoFactorStore::new();
        store
            .save("admin", TwoFactorRecord::enabled("AAAA", Utc::now()))
            .unwrap();
        store
            .save("admin", TwoFactorRecord::enabled("BBBB", Utc::now()))
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.load("admin").unwrap().unwrap().secret, "BBBB");
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Arc::new(MemoryTwoFactorStore::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let record = TwoFactorRecord::enabled(format!("SECRET{i}"), Utc::now());
                    store.save(&format!("user{i}"), record).unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 8);
        assert_eq!(store.load("user3").unwrap().unwrap().secret, "SECRET3");
    }
}
