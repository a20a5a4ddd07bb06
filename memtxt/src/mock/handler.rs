use crate::memcache_server::handler::TextHandler;
use crate::mock::mock_server::{
    create_basic_storage, create_dash_map_storage, create_moka_storage, MockSystemTimer,
    StoreWithMockTimer,
};
use crate::protocol::text::encoder::Response;
use crate::protocol::text::network::{GetRequest, StorageRequest, TextRequest};
use bytes::Bytes;
use std::sync::Arc;

pub const FANOUT_LIMIT: usize = 4;

pub struct TextHandlerWithTimer {
    pub handler: TextHandler,
    pub timer: Arc<MockSystemTimer>,
}

impl TextHandlerWithTimer {
    fn from_storage(store_with_timer: StoreWithMockTimer) -> TextHandlerWithTimer {
        TextHandlerWithTimer {
            handler: TextHandler::new(store_with_timer.memc_store, FANOUT_LIMIT),
            timer: store_with_timer.timer,
        }
    }

    pub async fn handle_request(&self, request: TextRequest) -> Option<Response> {
        self.handler.handle_request(request).await
    }
}

pub fn create_dash_map_handler() -> TextHandlerWithTimer {
    TextHandlerWithTimer::from_storage(create_dash_map_storage())
}

pub fn create_moka_handler() -> TextHandlerWithTimer {
    TextHandlerWithTimer::from_storage(create_moka_storage())
}

pub fn create_basic_handler() -> TextHandlerWithTimer {
    TextHandlerWithTimer::from_storage(create_basic_storage())
}

pub fn storage_request(key: &str, value: &str, flags: u32, exptime: i64) -> StorageRequest {
    StorageRequest {
        key: Bytes::copy_from_slice(key.as_bytes()),
        flags,
        exptime,
        value: Bytes::copy_from_slice(value.as_bytes()),
        noreply: false,
    }
}

pub fn create_set_request(key: &str, value: &str) -> TextRequest {
    TextRequest::Set(storage_request(key, value, 0, 0))
}

pub fn create_get_request(keys: &[&str]) -> TextRequest {
    TextRequest::Get(GetRequest {
        keys: keys
            .iter()
            .map(|key| Bytes::copy_from_slice(key.as_bytes()))
            .collect(),
    })
}

pub async fn insert_value(handler: &TextHandlerWithTimer, key: &str, value: &str) {
    let response = handler.handle_request(create_set_request(key, value)).await;
    assert_eq!(response, Some(Response::Stored));
}

pub async fn get_value(handler: &TextHandlerWithTimer, key: &str) -> Option<Bytes> {
    match handler.handle_request(create_get_request(&[key])).await {
        Some(Response::Values(mut values)) => values.pop().map(|value| value.data),
        other => panic!("unexpected get response {:?}", other),
    }
}
