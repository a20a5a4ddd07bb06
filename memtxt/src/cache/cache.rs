use super::cache_capability::{Add, KeyList, Replace, Touch, Update};
use super::error::Result;
use bytes::Bytes;

/// Cache key type
pub type KeyType = Bytes;

/// Cache value associated with a key
pub type ValueType = Bytes;

/// Absolute expiration time in Unix seconds, `0` means the record never expires
pub type ExpirationType = u64;

/// Meta data stored with cache value
#[derive(Clone, Debug)]
pub struct CacheMetaData {
    pub(crate) cas: u64,
    pub(crate) flags: u32,
    pub(crate) expiration: ExpirationType,
}

impl CacheMetaData {
    pub fn new(cas: u64, flags: u32, expiration: ExpirationType) -> CacheMetaData {
        CacheMetaData {
            cas,
            flags,
            expiration,
        }
    }

    pub fn get_expiration(&self) -> ExpirationType {
        self.expiration
    }

    pub fn get_flags(&self) -> u32 {
        self.flags
    }

    pub fn get_cas(&self) -> u64 {
        self.cas
    }

    pub const fn len(&self) -> usize {
        std::mem::size_of::<CacheMetaData>()
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Value and meta data stored in cache
#[derive(Clone, Debug)]
pub struct Record {
    pub(crate) header: CacheMetaData,
    pub(crate) value: ValueType,
}

impl Record {
    pub fn new(value: ValueType, cas: u64, flags: u32, expiration: ExpirationType) -> Record {
        let header = CacheMetaData::new(cas, flags, expiration);
        Record { header, value }
    }

    pub fn value(&self) -> &ValueType {
        &self.value
    }

    pub fn header(&self) -> &CacheMetaData {
        &self.header
    }

    /// A record is expired once its expiration instant is not in the future.
    /// Records with expiration `0` live until they are replaced or deleted.
    pub fn is_expired(&self, now: u64) -> bool {
        self.header.expiration != 0 && self.header.expiration <= now
    }

    pub fn len(&self) -> usize {
        self.header.len() + self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

// An abstraction over a generic key <=> value store.
//
// Only the four basic operations are mandatory, everything else is an
// optional capability exposed through the `as_*` accessors.
pub trait Cache {
    /// Returns a value associated with a key, expired records are reported
    /// as NotFound
    fn get(&self, key: &KeyType) -> Result<Record>;

    /// Stores a record unconditionally, replacing any previous value
    fn set(&self, key: KeyType, record: Record) -> Result<()>;

    /// Removes a value associated with a key and returns it to a caller.
    ///
    /// - if key is not found NotFound is returned
    fn delete(&self, key: &KeyType) -> Result<Record>;

    /// Returns true if a live (not expired) record is associated with a key
    fn exists(&self, key: &KeyType) -> bool;

    /// runs pending tasks (if any)
    /// will be scheduled periodically
    fn run_pending_tasks(&self) {}

    fn as_add(&self) -> Option<&dyn Add> {
        None
    }

    fn as_replace(&self) -> Option<&dyn Replace> {
        None
    }

    fn as_touch(&self) -> Option<&dyn Touch> {
        None
    }

    fn as_key_list(&self) -> Option<&dyn KeyList> {
        None
    }

    fn as_update(&self) -> Option<&dyn Update> {
        None
    }
}
