use crate::cache::cache::{Cache, ExpirationType, KeyType, Record};
use crate::cache::cache_capability::{Add, KeyList, Replace, Touch, Update};
use crate::cache::error::{CacheError, Result};
use crate::cache::eviction_policy::EvictionPolicy;
use crate::memory_store::shared_store_state::SharedStoreState;
use crate::server::timer;
use moka::ops::compute::Op;
use moka::policy::EvictionPolicy as MokaEvictionPolicy;
use moka::sync::Cache as MokaCache;
use std::sync::Arc;

type MokaStorage = MokaCache<KeyType, Record>;

/// Capacity bounded store, records are weighted by key and value size
pub struct MokaMemoryStore {
    memory: MokaStorage,
    store_state: SharedStoreState,
}

fn weigh_record(key: &KeyType, record: &Record) -> u32 {
    (key.len() + record.len()).try_into().unwrap_or(u32::MAX)
}

impl MokaMemoryStore {
    pub fn new(
        timer: Arc<dyn timer::Timer + Send + Sync>,
        max_capacity: u64,
        policy: EvictionPolicy,
    ) -> MokaMemoryStore {
        let builder = MokaCache::builder().weigher(weigh_record);
        let builder = match policy {
            EvictionPolicy::None => builder,
            EvictionPolicy::TinyLfu => builder
                .max_capacity(max_capacity)
                .eviction_policy(MokaEvictionPolicy::tiny_lfu()),
            EvictionPolicy::Lru => builder
                .max_capacity(max_capacity)
                .eviction_policy(MokaEvictionPolicy::lru()),
        };
        MokaMemoryStore {
            memory: builder.build(),
            store_state: SharedStoreState::new(timer),
        }
    }
}

impl Cache for MokaMemoryStore {
    fn get(&self, key: &KeyType) -> Result<Record> {
        let mut result = Err(CacheError::NotFound);
        let _entry = self
            .memory
            .entry(key.clone())
            .and_compute_with(|maybe_entry| match maybe_entry {
                Some(entry) => {
                    if self.store_state.check_if_expired(key, entry.value()) {
                        return Op::Remove;
                    }
                    result = Ok(entry.into_value());
                    Op::Nop
                }
                None => Op::Nop,
            });
        result
    }

    fn set(&self, key: KeyType, record: Record) -> Result<()> {
        self.memory.insert(key, record);
        Ok(())
    }

    fn delete(&self, key: &KeyType) -> Result<Record> {
        match self.memory.remove(key) {
            Some(record) => {
                if self.store_state.check_if_expired(key, &record) {
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

    fn run_pending_tasks(&self) {
        self.memory.run_pending_tasks()
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

impl Add for MokaMemoryStore {
    fn add(&self, key: KeyType, record: Record) -> Result<()> {
        let mut result: Result<()> = Err(CacheError::KeyExists);
        let _entry = self
            .memory
            .entry(key)
            .and_compute_with(|maybe_entry| match maybe_entry {
                Some(entry) if !self.store_state.check_if_expired(entry.key(), entry.value()) => {
                    Op::Nop
                }
                _ => {
                    result = Ok(());
                    Op::Put(record)
                }
            });
        result
    }
}

impl Replace for MokaMemoryStore {
    fn replace(&self, key: KeyType, record: Record) -> Result<()> {
        let mut result: Result<()> = Err(CacheError::ItemNotStored);
        let _entry = self
            .memory
            .entry(key)
            .and_compute_with(|maybe_entry| match maybe_entry {
                Some(entry) => {
                    if self.store_state.check_if_expired(entry.key(), entry.value()) {
                        return Op::Remove;
                    }
                    result = Ok(());
                    Op::Put(record)
                }
                None => Op::Nop,
            });
        result
    }
}

impl Touch for MokaMemoryStore {
    fn touch(&self, key: &KeyType, expiration: ExpirationType) -> Result<()> {
        self.update(key, &mut |record: &Record| {
            let mut touched = record.clone();
            touched.header.expiration = expiration;
            Ok(touched)
        })
        .map(|_record| ())
    }
}

impl KeyList for MokaMemoryStore {
    fn keys(&self) -> Vec<KeyType> {
        self.memory
            .iter()
            .map(|(key, _record)| key.as_ref().clone())
            .collect()
    }
}

impl Update for MokaMemoryStore {
    fn update(
        &self,
        key: &KeyType,
        modify: &mut dyn FnMut(&Record) -> Result<Record>,
    ) -> Result<Record> {
        let mut result = Err(CacheError::NotFound);
        let _entry = self
            .memory
            .entry(key.clone())
            .and_compute_with(|maybe_entry| match maybe_entry {
                Some(entry) => {
                    let record = entry.into_value();
                    if self.store_state.check_if_expired(key, &record) {
                        return Op::Remove;
                    }
                    match modify(&record) {
                        Ok(new_record) => {
                            result = Ok(new_record.clone());
                            Op::Put(new_record)
                        }
                        Err(err) => {
                            result = Err(err);
                            Op::Nop
                        }
                    }
                }
                None => Op::Nop,
            });
        result
    }
}
