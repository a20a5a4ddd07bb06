#![no_main]
use libfuzzer_sys::fuzz_target;
extern crate memtxt;
use bytes::{Bytes, BytesMut};
use memtxt::protocol::text::decoder;
use memtxt::protocol::text::encoder::{MemcacheTextEncoder, Response};
use memtxt::protocol::text::network::Frame;

fuzz_target!(|data: &[u8]| {
    let response = match decoder::parse_line(data) {
        Ok(Frame::Storage(header)) => {
            let value = Bytes::from(vec![0u8; header.bytes.min(64)]);
            let _request = header.into_request(value);
            Response::Stored
        }
        Ok(Frame::Request(_request)) => Response::Ok,
        Err(err) => Response::from(err),
    };
    let mut dst = BytesMut::new();
    MemcacheTextEncoder::new().encode(&response, &mut dst);
});
