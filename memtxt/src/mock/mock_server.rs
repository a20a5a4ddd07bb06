use crate::cache::cache::Cache;
use crate::cache::eviction_policy::EvictionPolicy;
use crate::memcache::store::MemcStore;
use crate::memory_store::dash_map_store::DashMapMemoryStore;
use crate::memory_store::moka_store::MokaMemoryStore as MokaStore;
use crate::mock::basic_store::BasicStore;
use crate::server::timer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const MOKA_TEST_CAPACITY: u64 = 64 * 1024 * 1024;

pub struct MockSystemTimer {
    pub current_time: AtomicU64,
}

pub trait SetableTimer: timer::Timer {
    fn set(&self, time: u64);
    fn add_seconds(&self, seconds: u64);
}

impl MockSystemTimer {
    pub fn new() -> Self {
        MockSystemTimer {
            current_time: AtomicU64::new(0),
        }
    }
}

impl Default for MockSystemTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl timer::Timer for MockSystemTimer {
    fn timestamp(&self) -> u64 {
        self.current_time.load(Ordering::Acquire)
    }
}

impl SetableTimer for MockSystemTimer {
    fn set(&self, time: u64) {
        self.current_time.store(time, Ordering::Release)
    }

    fn add_seconds(&self, seconds: u64) {
        self.current_time.fetch_add(seconds, Ordering::Release);
    }
}

pub struct MockServer {
    pub timer: Arc<MockSystemTimer>,
    pub storage: MemcStore,
}

impl MockServer {
    pub fn new(store: Arc<dyn Cache + Send + Sync>, timer: Arc<MockSystemTimer>) -> Self {
        MockServer {
            timer: timer.clone(),
            storage: MemcStore::new(store, timer),
        }
    }
}

fn moka_store(timer: Arc<MockSystemTimer>) -> Arc<dyn Cache + Send + Sync> {
    Arc::new(MokaStore::new(
        timer,
        MOKA_TEST_CAPACITY,
        EvictionPolicy::TinyLfu,
    ))
}

pub fn create_moka_server() -> MockServer {
    let timer = Arc::new(MockSystemTimer::new());
    MockServer::new(moka_store(timer.clone()), timer)
}

pub fn create_dash_map_server() -> MockServer {
    let timer = Arc::new(MockSystemTimer::new());
    MockServer::new(Arc::new(DashMapMemoryStore::new(timer.clone())), timer)
}

/// Store offering only the mandatory operations
pub fn create_basic_server() -> MockServer {
    let timer = Arc::new(MockSystemTimer::new());
    MockServer::new(Arc::new(BasicStore::new(timer.clone())), timer)
}

pub struct StoreWithMockTimer {
    pub timer: Arc<MockSystemTimer>,
    pub cache: Arc<dyn Cache + Send + Sync>,
    pub memc_store: Arc<MemcStore>,
}

impl StoreWithMockTimer {
    fn new(cache: Arc<dyn Cache + Send + Sync>, timer: Arc<MockSystemTimer>) -> Self {
        let memc_store = Arc::new(MemcStore::new(cache.clone(), timer.clone()));
        StoreWithMockTimer {
            timer,
            cache,
            memc_store,
        }
    }
}

pub fn create_dash_map_storage() -> StoreWithMockTimer {
    let timer = Arc::new(MockSystemTimer::new());
    StoreWithMockTimer::new(Arc::new(DashMapMemoryStore::new(timer.clone())), timer)
}

pub fn create_moka_storage() -> StoreWithMockTimer {
    let timer = Arc::new(MockSystemTimer::new());
    StoreWithMockTimer::new(moka_store(timer.clone()), timer)
}

pub fn create_basic_storage() -> StoreWithMockTimer {
    let timer = Arc::new(MockSystemTimer::new());
    StoreWithMockTimer::new(Arc::new(BasicStore::new(timer.clone())), timer)
}
