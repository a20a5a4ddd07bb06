pub const MEMTXT_VERSION: &str = env!("CARGO_PKG_VERSION");
