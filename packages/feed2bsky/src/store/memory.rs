//! In-memory dedup store for testing and development.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::traits::{BaseDedupStore, InsertOutcome};
use crate::types::DedupKey;

/// Keys are lost on restart; not suitable for production.
#[derive(Default)]
pub struct MemoryDedupStore {
    keys: RwLock<HashSet<DedupKey>>,
}

impl MemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with keys from an earlier run.
    pub fn with_keys(keys: impl IntoIterator<Item = DedupKey>) -> Self {
        Self {
            keys: RwLock::new(keys.into_iter().collect()),
        }
    }

    pub fn contains(&self, key: &DedupKey) -> bool {
        self.keys
            .read()
            .map(|keys| keys.contains(key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.keys.read().map(|keys| keys.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BaseDedupStore for MemoryDedupStore {
    async fn insert(&self, key: &DedupKey) -> Result<InsertOutcome> {
        let mut keys = self
            .keys
            .write()
            .map_err(|_| Error::Other("dedup store lock poisoned".to_string()))?;

        if keys.insert(key.clone()) {
            Ok(InsertOutcome::Inserted)
        } else {
            Ok(InsertOutcome::AlreadySeen)
        }
    }
}
