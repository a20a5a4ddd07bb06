use crate::cache::error::CacheError;
use thiserror::Error;

/// Failures detected while turning a request line into a request
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unknown command")]
    UnknownCommand,

    #[error("{0}")]
    InvalidCommand(&'static str),

    #[error("not implemented")]
    NotImplemented,

    #[error(transparent)]
    Cache(#[from] CacheError),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
