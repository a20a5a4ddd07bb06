use clap::ValueEnum;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// no eviction, store grows without limit
    None,
    /// admission by frequency, eviction by recency
    TinyLfu,
    /// least recently used
    Lru,
}

impl EvictionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionPolicy::None => "None",
            EvictionPolicy::TinyLfu => "Tiny LFU",
            EvictionPolicy::Lru => "LRU",
        }
    }
}
