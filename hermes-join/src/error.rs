//! Error types for hermes-join

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(
        "the number of join ordinals [{max_ord}] is greater than the allowed limit for this aggregation: {limit}"
    )]
    TooManyOrdinals { max_ord: u64, limit: u64 },

    #[error("Segment not found: {0}")]
    SegmentNotFound(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
