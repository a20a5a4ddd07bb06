#[allow(clippy::module_inception)]
pub mod cache;
pub mod cache_capability;
pub mod error;
pub mod eviction_policy;
pub mod pending_tasks_runner;
