//! Mock API key store for testing.

use crate::api_key::ApiKey;
use crate::error::{AuthError, Result};
use crate::providers::ApiKeyStore;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory API key store keyed by credential hash.
#[derive(Clone, Debug, Default)]
pub struct MockApiKeyStore {
    keys: Arc<Mutex<HashMap<String, ApiKey>>>,
    usage: Arc<Mutex<Vec<(Uuid, DateTime<Utc>)>>>,
    lookups: Arc<AtomicUsize>,
    fail_usage: Arc<AtomicBool>,
}

impl MockApiKeyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, indexed by its credential hash.
    pub fn insert(&self, key: ApiKey) {
        if let Ok(mut keys) = self.keys.lock() {
            keys.insert(key.key_hash.clone(), key);
        }
    }

    /// All `(key id, timestamp)` usage stamps recorded so far.
    #[must_use]
    pub fn recorded_usage(&self) -> Vec<(Uuid, DateTime<Utc>)> {
        self.usage.lock().map(|usage| usage.clone()).unwrap_or_default()
    }

    /// Number of hash lookups performed.
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Make every subsequent `record_usage` call fail.
    pub fn fail_usage_recording(&self) {
        self.fail_usage.store(true, Ordering::SeqCst);
    }
}

impl ApiKeyStore for MockApiKeyStore {
    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let keys = self
            .keys
            .lock()
            .map_err(|_| AuthError::InternalError("mutex poisoned".into()))?;
        Ok(keys.get(key_hash).cloned())
    }

    async fn record_usage(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        if self.fail_usage.load(Ordering::SeqCst) {
            return Err(AuthError::InternalError("usage recording disabled".into()));
        }
        let mut usage = self
            .usage
            .lock()
            .map_err(|_| AuthError::InternalError("mutex poisoned".into()))?;
        usage.push((id, at));
        Ok(())
    }
}
