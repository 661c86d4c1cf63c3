//! Error types for huffpack

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HuffmanError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pop from an empty priority queue")]
    EmptyQueue,

    #[error("total symbol weight does not fit in 64 bits")]
    WeightOverflow,

    #[error("corrupt stream: {0}")]
    CorruptStream(String),
}

pub type Result<T> = std::result::Result<T, HuffmanError>;
