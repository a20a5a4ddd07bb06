use crate::cache::cache::{KeyType, Record};
use crate::server::timer::Timer;
use std::sync::Arc;

/// State shared by every store engine: the clock used for lazy expiry.
pub struct SharedStoreState {
    timer: Arc<dyn Timer + Send + Sync>,
}

impl SharedStoreState {
    pub fn new(timer: Arc<dyn Timer + Send + Sync>) -> SharedStoreState {
        SharedStoreState { timer }
    }

    pub fn timestamp(&self) -> u64 {
        self.timer.timestamp()
    }

    pub fn check_if_expired(&self, key: &KeyType, record: &Record) -> bool {
        let expired = record.is_expired(self.timestamp());
        if expired {
            trace!("Record expired: {:?}", key);
        }
        expired
    }
}
