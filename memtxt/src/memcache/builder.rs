use crate::cache::cache::Cache;
use crate::cache::eviction_policy::EvictionPolicy;
use crate::memory_store::dash_map_store::DashMapMemoryStore;
use crate::memory_store::moka_store::MokaMemoryStore;
use crate::memory_store::StoreEngine;
use crate::server::timer;
use std::sync::Arc;

pub struct MemcacheStoreConfig {
    engine: StoreEngine,
    memory_limit: u64,
    policy: EvictionPolicy,
}

impl MemcacheStoreConfig {
    pub fn new(
        engine: StoreEngine,
        memory_limit: u64,
        policy: EvictionPolicy,
    ) -> MemcacheStoreConfig {
        MemcacheStoreConfig {
            engine,
            memory_limit,
            policy,
        }
    }
}

pub struct MemcacheStoreBuilder {}

impl MemcacheStoreBuilder {
    pub fn from_config(
        config: MemcacheStoreConfig,
        timer: Arc<dyn timer::Timer + Send + Sync>,
    ) -> Arc<dyn Cache + Send + Sync> {
        match config.engine {
            StoreEngine::DashMap => {
                if config.policy != EvictionPolicy::None {
                    warn!("{} ignores eviction policy", config.engine.as_str());
                }
                Arc::new(DashMapMemoryStore::new(timer))
            }
            StoreEngine::Moka => Arc::new(MokaMemoryStore::new(
                timer,
                config.memory_limit,
                config.policy,
            )),
        }
    }
}
