use crate::cache::cache::{Cache, ExpirationType, KeyType, Record};
use crate::cache::cache_capability::{Add, KeyList, Replace, Touch, Update};
use crate::cache::error::{CacheError, Result};
use crate::memory_store::parallelism;
use crate::memory_store::shared_store_state::SharedStoreState;
use crate::server::timer;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

type Storage = DashMap<KeyType, Record>;

/// Unbounded store backed by a sharded hash map, supports every capability
pub struct DashMapMemoryStore {
    memory: Storage,
    store_state: SharedStoreState,
}

impl DashMapMemoryStore {
    pub fn new(timer: Arc<dyn timer::Timer + Send + Sync>) -> DashMapMemoryStore {
        let shards = parallelism::default_shard_amount();
        info!("Number of shards: {}", shards);
        DashMapMemoryStore {
            memory: DashMap::with_shard_amount(shards),
            store_state: SharedStoreState::new(timer),
        }
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }
}

impl Cache for DashMapMemoryStore {
    fn get(&self, key: &KeyType) -> Result<Record> {
        match self.memory.entry(key.clone()) {
            Entry::Occupied(entry) => {
                if self.store_state.check_if_expired(key, entry.get()) {
                    entry.remove();
                    return Err(CacheError::NotFound);
                }
                Ok(entry.get().clone())
            }
            Entry::Vacant(_) => Err(CacheError::NotFound),
        }
    }

    fn set(&self, key: KeyType, record: Record) -> Result<()> {
        self.memory.insert(key, record);
        Ok(())
    }

    fn delete(&self, key: &KeyType) -> Result<Record> {
        match self.memory.remove(key) {
            Some((key, record)) => {
                if self.store_state.check_if_expired(&key, &record) {
                    return Err(CacheError::NotFound);
                }
                Ok(record)
            }
            None => Err(CacheError::NotFound),
        }
    }

    fn exists(&self, key: &KeyType) -> bool {
        self.get(key).is_ok()
    }

    fn as_add(&self) -> Option<&dyn Add> {
        Some(self)
    }

    fn as_replace(&self) -> Option<&dyn Replace> {
        Some(self)
    }

    fn as_touch(&self) -> Option<&dyn Touch> {
        Some(self)
    }

    fn as_key_list(&self) -> Option<&dyn KeyList> {
        Some(self)
    }

    fn as_update(&self) -> Option<&dyn Update> {
        Some(self)
    }
}

impl Add for DashMapMemoryStore {
    fn add(&self, key: KeyType, record: Record) -> Result<()> {
        match self.memory.entry(key) {
            Entry::Occupied(mut entry) => {
                if self.store_state.check_if_expired(entry.key(), entry.get()) {
                    entry.insert(record);
                    return Ok(());
                }
                Err(CacheError::KeyExists)
            }
            Entry::Vacant(entry) => {
                entry.insert(record);
                Ok(())
            }
        }
    }
}

impl Replace for DashMapMemoryStore {
    fn replace(&self, key: KeyType, record: Record) -> Result<()> {
        match self.memory.entry(key) {
            Entry::Occupied(mut entry) => {
                if self.store_state.check_if_expired(entry.key(), entry.get()) {
                    entry.remove();
                    return Err(CacheError::ItemNotStored);
                }
                entry.insert(record);
                Ok(())
            }
            Entry::Vacant(_) => Err(CacheError::ItemNotStored),
        }
    }
}

impl Touch for DashMapMemoryStore {
    fn touch(&self, key: &KeyType, expiration: ExpirationType) -> Result<()> {
        self.update(key, &mut |record: &Record| {
            let mut touched = record.clone();
            touched.header.expiration = expiration;
            Ok(touched)
        })
        .map(|_record| ())
    }
}

impl KeyList for DashMapMemoryStore {
    fn keys(&self) -> Vec<KeyType> {
        self.memory.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl Update for DashMapMemoryStore {
    fn update(
        &self,
        key: &KeyType,
        modify: &mut dyn FnMut(&Record) -> Result<Record>,
    ) -> Result<Record> {
        match self.memory.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                if self.store_state.check_if_expired(key, entry.get()) {
                    entry.remove();
                    return Err(CacheError::NotFound);
                }
                let new_record = modify(entry.get())?;
                entry.insert(new_record.clone());
                Ok(new_record)
            }
            Entry::Vacant(_) => Err(CacheError::NotFound),
        }
    }
}
