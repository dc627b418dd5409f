//! Error types and handling for logging operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no active background worker")]
    NoActiveWorker,
    #[error("background task dropped before completing")]
    TaskDropped,
    #[error("invalid sink prefix: {0}")]
    InvalidPrefix(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
