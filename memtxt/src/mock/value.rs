use crate::cache::cache::{KeyType, Record, ValueType};
use bytes::{BufMut, BytesMut};

pub fn from_string(val: &str) -> ValueType {
    from_slice(val.as_bytes())
}

pub fn from_slice(val: &[u8]) -> ValueType {
    let mut value = BytesMut::with_capacity(val.len());
    value.put_slice(val);
    value.freeze()
}

pub fn key(val: &str) -> KeyType {
    from_string(val)
}

pub fn record(val: &str, flags: u32, expiration: u64) -> Record {
    Record::new(from_string(val), 0, flags, expiration)
}
