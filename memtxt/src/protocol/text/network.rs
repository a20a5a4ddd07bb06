use bytes::Bytes;

/// Longest key accepted by memcached
pub const MAX_KEY_LENGTH: usize = 250;

/// Marker suppressing the reply of a mutation
pub const NOREPLY: &[u8] = b"noreply";

pub const BAD_FORMAT: &str = "bad command line format";
pub const KEY_TOO_LONG: &str = "key too long";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageVerb {
    Set,
    Add,
    Replace,
    Append,
    Prepend,
    Cas,
}

impl StorageVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageVerb::Set => "set",
            StorageVerb::Add => "add",
            StorageVerb::Replace => "replace",
            StorageVerb::Append => "append",
            StorageVerb::Prepend => "prepend",
            StorageVerb::Cas => "cas",
        }
    }
}

/// Header line of a storage command, complete once its data block is read
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageHeader {
    pub verb: StorageVerb,
    pub key: Bytes,
    pub flags: u32,
    pub exptime: i64,
    pub bytes: usize,
    pub cas_unique: u64,
    pub noreply: bool,
}

impl StorageHeader {
    pub fn into_request(self, value: Bytes) -> TextRequest {
        let request = StorageRequest {
            key: self.key,
            flags: self.flags,
            exptime: self.exptime,
            value,
            noreply: self.noreply,
        };
        match self.verb {
            StorageVerb::Set => TextRequest::Set(request),
            StorageVerb::Add => TextRequest::Add(request),
            StorageVerb::Replace => TextRequest::Replace(request),
            StorageVerb::Append => TextRequest::Append(request),
            StorageVerb::Prepend => TextRequest::Prepend(request),
            StorageVerb::Cas => TextRequest::Cas(CasRequest {
                request,
                cas_unique: self.cas_unique,
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageRequest {
    pub key: Bytes,
    pub flags: u32,
    pub exptime: i64,
    pub value: Bytes,
    pub noreply: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CasRequest {
    pub request: StorageRequest,
    pub cas_unique: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetRequest {
    pub keys: Vec<Bytes>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteRequest {
    pub key: Bytes,
    pub noreply: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArithmeticRequest {
    pub key: Bytes,
    pub delta: u64,
    pub noreply: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TouchRequest {
    pub key: Bytes,
    pub exptime: i64,
    pub noreply: bool,
}

/// Client request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextRequest {
    Get(GetRequest),
    Gets(GetRequest),
    Set(StorageRequest),
    Add(StorageRequest),
    Replace(StorageRequest),
    Append(StorageRequest),
    Prepend(StorageRequest),
    Cas(CasRequest),
    Delete(DeleteRequest),
    Increment(ArithmeticRequest),
    Decrement(ArithmeticRequest),
    Touch(TouchRequest),
    FlushAll,
    Quit,
    /// recognised verb without an implementation (`gat`, `stats`, ...)
    NotImplemented(Bytes),
}

impl TextRequest {
    pub fn noreply(&self) -> bool {
        match self {
            TextRequest::Set(request)
            | TextRequest::Add(request)
            | TextRequest::Replace(request)
            | TextRequest::Append(request)
            | TextRequest::Prepend(request) => request.noreply,
            TextRequest::Cas(cas) => cas.request.noreply,
            TextRequest::Delete(request) => request.noreply,
            TextRequest::Increment(request) | TextRequest::Decrement(request) => request.noreply,
            TextRequest::Touch(request) => request.noreply,
            TextRequest::Get(_)
            | TextRequest::Gets(_)
            | TextRequest::FlushAll
            | TextRequest::Quit
            | TextRequest::NotImplemented(_) => false,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            TextRequest::Get(_) => "get",
            TextRequest::Gets(_) => "gets",
            TextRequest::Set(_) => "set",
            TextRequest::Add(_) => "add",
            TextRequest::Replace(_) => "replace",
            TextRequest::Append(_) => "append",
            TextRequest::Prepend(_) => "prepend",
            TextRequest::Cas(_) => "cas",
            TextRequest::Delete(_) => "delete",
            TextRequest::Increment(_) => "incr",
            TextRequest::Decrement(_) => "decr",
            TextRequest::Touch(_) => "touch",
            TextRequest::FlushAll => "flush_all",
            TextRequest::Quit => "quit",
            TextRequest::NotImplemented(_) => "not_implemented",
        }
    }
}

/// Result of decoding one request line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Request(TextRequest),
    Storage(StorageHeader),
}
