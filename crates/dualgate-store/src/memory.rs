//! In-memory identity store

use crate::traits::IdentityStore;
use async_trait::async_trait;
use dualgate_core::types::IdentityRecord;
use dualgate_core::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryIdentityStore {
    records: RwLock<HashMap<String, IdentityRecord>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = IdentityRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub fn insert(&self, record: IdentityRecord) {
        self.records.write().insert(record.username.clone(), record);
    }

    pub fn remove(&self, username: &str) -> Option<IdentityRecord> {
        self.records.write().remove(username)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn get(&self, username: &str) -> Result<IdentityRecord> {
        self.records
            .read()
            .get(username)
            .cloned()
            .ok_or_else(|| Error::NotFound(username.to_string()))
    }
}
