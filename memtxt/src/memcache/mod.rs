pub mod builder;
pub mod cli;
pub mod expiration;
pub mod store;
