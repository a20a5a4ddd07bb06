use crate::cache::cache::{
    Cache, CacheMetaData as CacheMeta, ExpirationType, KeyType as CacheKeyType,
    Record as CacheRecord,
};
use crate::cache::cache_capability::CacheCapabilities;
use crate::cache::error::{CacheError, Result};
use crate::memcache::expiration;
use crate::server::timer::Timer;
use bytes::{Bytes, BytesMut};
use std::str;
use std::sync::Arc;

pub type Record = CacheRecord;
pub type Meta = CacheMeta;
pub type KeyType = CacheKeyType;

/**
 * Implements memcache commands on top of
 * a key value store. Optional store capabilities
 * are probed once, missing ones are reported as
 * NotSupported.
 */
pub struct MemcStore {
    store: Arc<dyn Cache + Send + Sync>,
    timer: Arc<dyn Timer + Send + Sync>,
    capabilities: CacheCapabilities,
}

impl MemcStore {
    pub fn new(
        store: Arc<dyn Cache + Send + Sync>,
        timer: Arc<dyn Timer + Send + Sync>,
    ) -> MemcStore {
        let capabilities = CacheCapabilities::probe(store.as_ref());
        debug!("Store capabilities: {:?}", capabilities);
        MemcStore {
            store,
            timer,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> CacheCapabilities {
        self.capabilities
    }

    /// Absolute expiration for the exptime sent by a client
    pub fn expiration(&self, exptime: i64) -> ExpirationType {
        expiration::get_expiration(exptime, self.timer.timestamp())
    }

    pub fn get(&self, key: &KeyType) -> Result<Record> {
        self.store.get(key)
    }

    pub fn set(&self, key: KeyType, record: Record) -> Result<()> {
        self.store.set(key, record)
    }

    pub fn delete(&self, key: &KeyType) -> Result<Record> {
        self.store.delete(key)
    }

    pub fn exists(&self, key: &KeyType) -> bool {
        self.store.exists(key)
    }

    pub fn add(&self, key: KeyType, record: Record) -> Result<()> {
        if !self.capabilities.add {
            return Err(CacheError::NotSupported);
        }
        self.store
            .as_add()
            .ok_or(CacheError::NotSupported)?
            .add(key, record)
    }

    pub fn replace(&self, key: KeyType, record: Record) -> Result<()> {
        if !self.capabilities.replace {
            return Err(CacheError::NotSupported);
        }
        self.store
            .as_replace()
            .ok_or(CacheError::NotSupported)?
            .replace(key, record)
    }

    pub fn touch(&self, key: &KeyType, expiration: ExpirationType) -> Result<()> {
        if !self.capabilities.touch {
            return Err(CacheError::NotSupported);
        }
        self.store
            .as_touch()
            .ok_or(CacheError::NotSupported)?
            .touch(key, expiration)
    }

    pub fn keys(&self) -> Result<Vec<KeyType>> {
        if !self.capabilities.key_list {
            return Err(CacheError::NotSupported);
        }
        Ok(self
            .store
            .as_key_list()
            .ok_or(CacheError::NotSupported)?
            .keys())
    }

    /// Read-modify-write of a single record. Atomic when the store
    /// offers the update capability, otherwise a plain get followed
    /// by set that can lose concurrent writes to the same key.
    pub fn update<F>(&self, key: &KeyType, mut modify: F) -> Result<Record>
    where
        F: FnMut(&Record) -> Result<Record>,
    {
        if self.capabilities.update {
            if let Some(update) = self.store.as_update() {
                return update.update(key, &mut modify);
            }
        }

        if !self.store.exists(key) {
            return Err(CacheError::NotFound);
        }
        let record = self.store.get(key)?;
        let new_record = modify(&record)?;
        self.store.set(key.clone(), new_record.clone())?;
        Ok(new_record)
    }
}

fn not_found_as_not_stored(err: CacheError) -> CacheError {
    match err {
        CacheError::NotFound => CacheError::ItemNotStored,
        err => err,
    }
}

fn concat(first: &[u8], second: &[u8]) -> Bytes {
    let mut value = BytesMut::with_capacity(first.len() + second.len());
    value.extend_from_slice(first);
    value.extend_from_slice(second);
    value.freeze()
}

fn parse_counter(record: &Record) -> Result<u64> {
    str::from_utf8(record.value())
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .ok_or(CacheError::ArithOnNonNumeric)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeltaOp {
    Increment,
    Decrement,
}

impl MemcStore {
    /// Adds data after the existing value. Keeps existing flags and
    /// takes the expiration of the new record.
    pub fn append(&self, key: &KeyType, record: Record) -> Result<()> {
        self.update(key, |existing| {
            Ok(Record::new(
                concat(existing.value(), record.value()),
                0,
                existing.header.flags,
                record.header.expiration,
            ))
        })
        .map(|_record| ())
        .map_err(not_found_as_not_stored)
    }

    /// Adds data before the existing value, existing flags and
    /// expiration are kept.
    pub fn prepend(&self, key: &KeyType, record: Record) -> Result<()> {
        self.update(key, |existing| {
            Ok(Record::new(
                concat(record.value(), existing.value()),
                0,
                existing.header.flags,
                existing.header.expiration,
            ))
        })
        .map(|_record| ())
        .map_err(not_found_as_not_stored)
    }

    /// Applies delta to a decimal counter using wrapping u64 arithmetic
    /// and returns the new value.
    pub fn increment_decrement(
        &self,
        key: &KeyType,
        delta: u64,
        op: DeltaOp,
    ) -> Result<u64> {
        let mut counter = 0;
        self.update(key, |existing| {
            let current = parse_counter(existing)?;
            counter = match op {
                DeltaOp::Increment => current.wrapping_add(delta),
                DeltaOp::Decrement => current.wrapping_sub(delta),
            };
            Ok(Record::new(
                Bytes::from(counter.to_string()),
                0,
                existing.header.flags,
                existing.header.expiration,
            ))
        })?;
        Ok(counter)
    }

    pub fn increment(&self, key: &KeyType, delta: u64) -> Result<u64> {
        self.increment_decrement(key, delta, DeltaOp::Increment)
    }

    pub fn decrement(&self, key: &KeyType, delta: u64) -> Result<u64> {
        self.increment_decrement(key, delta, DeltaOp::Decrement)
    }
}
