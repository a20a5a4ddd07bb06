pub mod basic_store;
pub mod handler;
pub mod mock_server;
pub mod value;
