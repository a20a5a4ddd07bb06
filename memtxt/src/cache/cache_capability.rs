use super::cache::{Cache, ExpirationType, KeyType, Record};
use super::error::Result;

/// Store only if the key is absent, fails with KeyExists otherwise
pub trait Add {
    fn add(&self, key: KeyType, record: Record) -> Result<()>;
}

/// Store only if the key is present, fails with ItemNotStored otherwise
pub trait Replace {
    fn replace(&self, key: KeyType, record: Record) -> Result<()>;
}

/// Update expiration of a live record without touching its value
pub trait Touch {
    fn touch(&self, key: &KeyType, expiration: ExpirationType) -> Result<()>;
}

/// Enumerate keys currently held by the store
pub trait KeyList {
    fn keys(&self) -> Vec<KeyType>;
}

/// Atomic read-modify-write of a single live record.
///
/// The closure receives the current record and returns its replacement,
/// an error returned by the closure leaves the record untouched.
/// Fails with NotFound if the key is absent or expired.
pub trait Update {
    fn update(
        &self,
        key: &KeyType,
        modify: &mut dyn FnMut(&Record) -> Result<Record>,
    ) -> Result<Record>;
}

/// Set of optional operations a store offers, probed once
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheCapabilities {
    pub add: bool,
    pub replace: bool,
    pub touch: bool,
    pub key_list: bool,
    pub update: bool,
}

impl CacheCapabilities {
    pub fn probe(store: &dyn Cache) -> CacheCapabilities {
        CacheCapabilities {
            add: store.as_add().is_some(),
            replace: store.as_replace().is_some(),
            touch: store.as_touch().is_some(),
            key_list: store.as_key_list().is_some(),
            update: store.as_update().is_some(),
        }
    }

    pub fn all() -> CacheCapabilities {
        CacheCapabilities {
            add: true,
            replace: true,
            touch: true,
            key_list: true,
            update: true,
        }
    }
}
