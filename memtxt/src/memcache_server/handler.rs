use crate::cache::error::CacheError;
use crate::memcache::store::{self, KeyType, Record};
use crate::protocol::text::encoder::{Response, Value};
use crate::protocol::text::error::ProtocolError;
use crate::protocol::text::network::{
    ArithmeticRequest, DeleteRequest, GetRequest, StorageRequest, TextRequest, TouchRequest,
};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

fn into_record(storage: &store::MemcStore, request: StorageRequest) -> (KeyType, Record) {
    let expiration = storage.expiration(request.exptime);
    (
        request.key,
        Record::new(request.value, 0, request.flags, expiration),
    )
}

fn into_stored(result: Result<(), CacheError>) -> Response {
    match result {
        Ok(()) => Response::Stored,
        Err(err) => Response::from(err),
    }
}

fn lookup(storage: &store::MemcStore, key: KeyType) -> Option<Value> {
    match storage.get(&key) {
        Ok(record) => Some(Value {
            flags: record.header().get_flags(),
            cas: record.header().get_cas(),
            data: record.value().clone(),
            key,
        }),
        Err(CacheError::NotFound) => None,
        Err(err) => {
            warn!("Lookup of {:?} failed: {}", key, err);
            None
        }
    }
}

fn flush_key(storage: &store::MemcStore, key: &KeyType) -> Result<(), CacheError> {
    match storage.delete(key) {
        Ok(_) | Err(CacheError::NotFound) => Ok(()),
        Err(err) => Err(err),
    }
}

/// Executes text protocol requests against the store
pub struct TextHandler {
    storage: Arc<store::MemcStore>,
    fanout_limit: usize,
}

impl TextHandler {
    pub fn new(store: Arc<store::MemcStore>, fanout_limit: usize) -> TextHandler {
        TextHandler {
            storage: store,
            fanout_limit: fanout_limit.max(1),
        }
    }

    /// Returns the response to send, `None` when nothing is written back
    pub async fn handle_request(&self, request: TextRequest) -> Option<Response> {
        let noreply = request.noreply();
        let response = self.dispatch(request).await;
        if noreply {
            return None;
        }
        response
    }

    async fn dispatch(&self, request: TextRequest) -> Option<Response> {
        match request {
            TextRequest::Get(get_request) | TextRequest::Gets(get_request) => {
                Some(self.get(get_request).await)
            }
            TextRequest::Set(set_request) => Some(self.set(set_request)),
            TextRequest::Add(add_request) => Some(self.add(add_request)),
            TextRequest::Replace(replace_request) => Some(self.replace(replace_request)),
            TextRequest::Append(append_request) => Some(self.append(append_request)),
            TextRequest::Prepend(prepend_request) => Some(self.prepend(prepend_request)),
            TextRequest::Delete(delete_request) => Some(self.delete(delete_request)),
            TextRequest::Increment(incr_request) => Some(self.increment(incr_request)),
            TextRequest::Decrement(decr_request) => Some(self.decrement(decr_request)),
            TextRequest::Touch(touch_request) => self.touch(touch_request),
            TextRequest::FlushAll => Some(self.flush_all().await),
            TextRequest::Quit => None,
            TextRequest::Cas(_) | TextRequest::NotImplemented(_) => {
                Some(Response::from(ProtocolError::NotImplemented))
            }
        }
    }

    async fn get(&self, request: GetRequest) -> Response {
        if request.keys.len() == 1 {
            let values = request
                .keys
                .into_iter()
                .filter_map(|key| lookup(&self.storage, key))
                .collect();
            return Response::Values(values);
        }

        // one task per key, results come back in request order
        let results: Vec<_> = stream::iter(request.keys)
            .map(|key| {
                let storage = Arc::clone(&self.storage);
                tokio::spawn(async move { lookup(&storage, key) })
            })
            .buffered(self.fanout_limit)
            .collect()
            .await;

        let mut values = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(Some(value)) => values.push(value),
                Ok(None) => {}
                Err(err) => {
                    error!("Lookup task failed: {}", err);
                    return Response::server_error("lookup failed");
                }
            }
        }
        Response::Values(values)
    }

    fn set(&self, request: StorageRequest) -> Response {
        let (key, record) = into_record(&self.storage, request);
        into_stored(self.storage.set(key, record))
    }

    fn add(&self, request: StorageRequest) -> Response {
        let (key, record) = into_record(&self.storage, request);
        into_stored(self.storage.add(key, record))
    }

    fn replace(&self, request: StorageRequest) -> Response {
        let (key, record) = into_record(&self.storage, request);
        into_stored(self.storage.replace(key, record))
    }

    fn append(&self, request: StorageRequest) -> Response {
        let (key, record) = into_record(&self.storage, request);
        into_stored(self.storage.append(&key, record))
    }

    fn prepend(&self, request: StorageRequest) -> Response {
        let (key, record) = into_record(&self.storage, request);
        into_stored(self.storage.prepend(&key, record))
    }

    fn delete(&self, request: DeleteRequest) -> Response {
        match self.storage.delete(&request.key) {
            Ok(_record) => Response::Deleted,
            Err(err) => Response::from(err),
        }
    }

    fn increment(&self, request: ArithmeticRequest) -> Response {
        match self.storage.increment(&request.key, request.delta) {
            Ok(value) => Response::Number(value),
            Err(err) => Response::from(err),
        }
    }

    fn decrement(&self, request: ArithmeticRequest) -> Response {
        match self.storage.decrement(&request.key, request.delta) {
            Ok(value) => Response::Number(value),
            Err(err) => Response::from(err),
        }
    }

    fn touch(&self, request: TouchRequest) -> Option<Response> {
        let expiration = self.storage.expiration(request.exptime);
        match self.storage.touch(&request.key, expiration) {
            Ok(()) => None,
            Err(err) => Some(Response::from(err)),
        }
    }

    async fn flush_all(&self) -> Response {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(err) => return Response::from(err),
        };
        debug!("Flushing {} keys", keys.len());

        let results: Vec<_> = stream::iter(keys)
            .map(|key| {
                let storage = Arc::clone(&self.storage);
                tokio::spawn(async move { flush_key(&storage, &key) })
            })
            .buffer_unordered(self.fanout_limit)
            .collect()
            .await;

        let mut response = Response::Ok;
        for result in results {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    error!("Flush failed: {}", err);
                    response = Response::ServerError(err.to_string());
                }
                Err(err) => {
                    error!("Flush task failed: {}", err);
                    response = Response::server_error("flush failed");
                }
            }
        }
        response
    }
}
