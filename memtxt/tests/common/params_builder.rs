use memtxt::{cache::eviction_policy::EvictionPolicy, memory_store::StoreEngine};

pub struct MemtxtdServerParamsBuilder {
    pub(crate) engine: StoreEngine,
    pub(crate) policy: EvictionPolicy,
    pub(crate) memory_limit: u64,
    pub(crate) item_size_limit: u64,
    pub(crate) connection_limit: u32,
    pub(crate) idle_timeout: u64,
    pub(crate) fanout_limit: usize,
}

#[allow(dead_code)]
impl MemtxtdServerParamsBuilder {
    pub fn new() -> MemtxtdServerParamsBuilder {
        MemtxtdServerParamsBuilder {
            engine: StoreEngine::DashMap,
            policy: EvictionPolicy::None,
            memory_limit: 1024 * 1024 * 64,
            item_size_limit: 1024 * 1024,
            connection_limit: 64,
            idle_timeout: 0,
            fanout_limit: 4,
        }
    }

    pub fn with_engine(mut self, engine: StoreEngine, policy: EvictionPolicy) -> Self {
        self.engine = engine;
        self.policy = policy;
        self
    }

    pub fn with_item_size_limit(mut self, item_size_limit: u64) -> Self {
        self.item_size_limit = item_size_limit;
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: u64) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn with_connection_limit(mut self, connection_limit: u32) -> Self {
        self.connection_limit = connection_limit;
        self
    }
}
