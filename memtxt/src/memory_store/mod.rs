use clap::ValueEnum;

pub mod dash_map_store;
pub mod moka_store;
pub mod parallelism;
pub mod shared_store_state;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum StoreEngine {
    /// unbounded store based on dashmap library
    DashMap,
    /// capacity bounded store based on moka library
    Moka,
}

impl StoreEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreEngine::DashMap => "DashMap backend",
            StoreEngine::Moka => "Moka backend",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_engine_cli_names() {
        assert_eq!(
            StoreEngine::from_str("dash-map", true).unwrap(),
            StoreEngine::DashMap
        );
        assert_eq!(StoreEngine::from_str("moka", true).unwrap(), StoreEngine::Moka);
        assert!(StoreEngine::from_str("redis", true).is_err());
    }
}
