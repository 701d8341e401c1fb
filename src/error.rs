//! Error handling: a `thiserror` enum wrapping `anyhow::Error` per
//! failure domain, plus a `Kind` extension trait for tagging a
//! `std::error::Error` with the domain it failed in, mirroring
//! `anyhow::Context::context`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[source] anyhow::Error),
    #[error("invalid request: {0}")]
    InvalidRequest(#[source] anyhow::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::InvalidConfig(anyhow::Error::from(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The domain an underlying error failed in, used to pick an `Error`
/// variant without hand-writing a `From` impl for every source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidConfig,
    InvalidRequest,
}

/// Tags a fallible result with the `ErrorKind` it should become on
/// failure, the way `anyhow::Context::context` tags one with a message.
pub trait Kind<T> {
    fn kind(self, kind: ErrorKind) -> Result<T>;
}

impl<T, E> Kind<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn kind(self, kind: ErrorKind) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            match kind {
                ErrorKind::InvalidConfig => Error::InvalidConfig(err),
                ErrorKind::InvalidRequest => Error::InvalidRequest(err),
            }
        })
    }
}
