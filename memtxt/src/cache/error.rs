use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Not found")]
    NotFound,
    #[error("Key exists")]
    KeyExists,
    #[error("Item not stored")]
    ItemNotStored,
    #[error("Value too big")]
    ValueTooLarge,
    #[error("Incr/Decr on non numeric value")]
    ArithOnNonNumeric,
    #[error("Not supported")]
    NotSupported,
    #[error("{0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;
