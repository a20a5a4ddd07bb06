use crate::cache::error::CacheError;
use crate::protocol::text::error::ProtocolError;
use bytes::{BufMut, Bytes, BytesMut};

const CRLF: &[u8] = b"\r\n";

pub const NOT_IMPLEMENTED: &str = "not implemented";
pub const OBJECT_TOO_LARGE: &str = "object too large for cache";
pub const BAD_DATA_CHUNK: &str = "bad data chunk";
pub const NON_NUMERIC_VALUE: &str = "cannot increment or decrement non-numeric value";

/// Single `VALUE` entry of a retrieval response
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Value {
    pub key: Bytes,
    pub flags: u32,
    pub cas: u64,
    pub data: Bytes,
}

/// Server response
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Stored,
    NotStored,
    Exists,
    NotFound,
    Deleted,
    Ok,
    Values(Vec<Value>),
    Number(u64),
    Error,
    ClientError(String),
    ServerError(String),
}

impl Response {
    pub fn server_error(message: &str) -> Response {
        Response::ServerError(String::from(message))
    }
}

pub fn storage_error_to_response(err: CacheError) -> Response {
    match err {
        CacheError::NotFound => Response::NotFound,
        CacheError::KeyExists => Response::Exists,
        CacheError::ItemNotStored => Response::NotStored,
        CacheError::ValueTooLarge => Response::server_error(OBJECT_TOO_LARGE),
        CacheError::ArithOnNonNumeric => Response::ClientError(String::from(NON_NUMERIC_VALUE)),
        CacheError::NotSupported => Response::server_error(NOT_IMPLEMENTED),
        CacheError::InternalError(message) => Response::ServerError(message),
    }
}

impl From<ProtocolError> for Response {
    fn from(err: ProtocolError) -> Response {
        match err {
            ProtocolError::UnknownCommand => Response::Error,
            ProtocolError::InvalidCommand(detail) => Response::ClientError(String::from(detail)),
            ProtocolError::NotImplemented => Response::server_error(NOT_IMPLEMENTED),
            ProtocolError::Cache(err) => storage_error_to_response(err),
        }
    }
}

impl From<CacheError> for Response {
    fn from(err: CacheError) -> Response {
        storage_error_to_response(err)
    }
}

#[derive(Default)]
pub struct MemcacheTextEncoder {}

impl MemcacheTextEncoder {
    pub fn new() -> MemcacheTextEncoder {
        MemcacheTextEncoder {}
    }

    pub fn encode(&self, response: &Response, dst: &mut BytesMut) {
        match response {
            Response::Stored => put_line(dst, b"STORED"),
            Response::NotStored => put_line(dst, b"NOT_STORED"),
            Response::Exists => put_line(dst, b"EXISTS"),
            Response::NotFound => put_line(dst, b"NOT_FOUND"),
            Response::Deleted => put_line(dst, b"DELETED"),
            Response::Ok => put_line(dst, b"OK"),
            Response::Values(values) => {
                for value in values {
                    self.encode_value(value, dst);
                }
                put_line(dst, b"END");
            }
            Response::Number(number) => put_line(dst, number.to_string().as_bytes()),
            Response::Error => put_line(dst, b"ERROR"),
            Response::ClientError(message) => {
                dst.put_slice(b"CLIENT_ERROR ");
                put_line(dst, message.as_bytes());
            }
            Response::ServerError(message) => {
                dst.put_slice(b"SERVER_ERROR ");
                put_line(dst, message.as_bytes());
            }
        }
    }

    fn encode_value(&self, value: &Value, dst: &mut BytesMut) {
        let header = format!(" {} {} {}", value.flags, value.data.len(), value.cas);
        dst.reserve(6 + value.key.len() + header.len() + value.data.len() + 2 * CRLF.len());
        dst.put_slice(b"VALUE ");
        dst.put_slice(&value.key);
        put_line(dst, header.as_bytes());
        put_line(dst, &value.data);
    }
}

fn put_line(dst: &mut BytesMut, line: &[u8]) {
    dst.reserve(line.len() + CRLF.len());
    dst.put_slice(line);
    dst.put_slice(CRLF);
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn encode(response: Response) -> BytesMut {
        let mut dst = BytesMut::new();
        MemcacheTextEncoder::new().encode(&response, &mut dst);
        dst
    }

    #[test_case(Response::Stored, "STORED\r\n")]
    #[test_case(Response::NotStored, "NOT_STORED\r\n")]
    #[test_case(Response::Exists, "EXISTS\r\n")]
    #[test_case(Response::NotFound, "NOT_FOUND\r\n")]
    #[test_case(Response::Deleted, "DELETED\r\n")]
    #[test_case(Response::Ok, "OK\r\n")]
    #[test_case(Response::Error, "ERROR\r\n")]
    #[test_case(Response::Number(18_446_744_073_709_551_606), "18446744073709551606\r\n")]
    #[test_case(Response::ClientError(String::from("bad command line format")), "CLIENT_ERROR bad command line format\r\n")]
    #[test_case(Response::server_error(NOT_IMPLEMENTED), "SERVER_ERROR not implemented\r\n")]
    #[test_case(Response::Values(vec![]), "END\r\n")]
    fn encode_status_lines(response: Response, expected: &str) {
        assert_eq!(&encode(response)[..], expected.as_bytes());
    }

    #[test]
    fn encode_values_block() {
        let response = Response::Values(vec![
            Value {
                key: Bytes::from("a"),
                flags: 5,
                cas: 0,
                data: Bytes::from("hello"),
            },
            Value {
                key: Bytes::from("b"),
                flags: 0,
                cas: 0,
                data: Bytes::from_static(b"x\r\ny"),
            },
        ]);
        assert_eq!(
            &encode(response)[..],
            &b"VALUE a 5 5 0\r\nhello\r\nVALUE b 0 4 0\r\nx\r\ny\r\nEND\r\n"[..]
        );
    }

    #[test_case(ProtocolError::UnknownCommand, Response::Error)]
    #[test_case(ProtocolError::InvalidCommand("key too long"), Response::ClientError(String::from("key too long")))]
    #[test_case(ProtocolError::NotImplemented, Response::server_error(NOT_IMPLEMENTED))]
    #[test_case(ProtocolError::Cache(CacheError::KeyExists), Response::Exists)]
    #[test_case(ProtocolError::Cache(CacheError::ItemNotStored), Response::NotStored)]
    #[test_case(ProtocolError::Cache(CacheError::NotFound), Response::NotFound)]
    #[test_case(ProtocolError::Cache(CacheError::NotSupported), Response::server_error(NOT_IMPLEMENTED))]
    #[test_case(ProtocolError::Cache(CacheError::ValueTooLarge), Response::server_error(OBJECT_TOO_LARGE))]
    #[test_case(ProtocolError::Cache(CacheError::ArithOnNonNumeric), Response::ClientError(String::from(NON_NUMERIC_VALUE)))]
    #[test_case(ProtocolError::Cache(CacheError::InternalError(String::from("boom"))), Response::server_error("boom"))]
    fn error_mapping_is_total(err: ProtocolError, expected: Response) {
        assert_eq!(Response::from(err), expected);
    }
}
