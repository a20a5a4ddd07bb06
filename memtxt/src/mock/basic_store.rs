use crate::cache::cache::{Cache, KeyType, Record};
use crate::cache::error::{CacheError, Result};
use crate::server::timer::Timer;
use dashmap::DashMap;
use std::sync::Arc;

/// A store implementing only get, set, delete and exists
pub struct BasicStore {
    memory: DashMap<KeyType, Record>,
    timer: Arc<dyn Timer + Send + Sync>,
}

impl BasicStore {
    pub fn new(timer: Arc<dyn Timer + Send + Sync>) -> BasicStore {
        BasicStore {
            memory: DashMap::new(),
            timer,
        }
    }
}

impl Cache for BasicStore {
    fn get(&self, key: &KeyType) -> Result<Record> {
        let now = self.timer.timestamp();
        match self.memory.get(key) {
            Some(record) if !record.is_expired(now) => Ok(record.clone()),
            _ => Err(CacheError::NotFound),
        }
    }

    fn set(&self, key: KeyType, record: Record) -> Result<()> {
        self.memory.insert(key, record);
        Ok(())
    }

    fn delete(&self, key: &KeyType) -> Result<Record> {
        let now = self.timer.timestamp();
        match self.memory.remove(key) {
            Some((_key, record)) if !record.is_expired(now) => Ok(record),
            _ => Err(CacheError::NotFound),
        }
    }

    fn exists(&self, key: &KeyType) -> bool {
        self.get(key).is_ok()
    }
}
