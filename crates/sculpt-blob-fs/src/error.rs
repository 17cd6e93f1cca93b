//! Error type for `sculpt-blob-fs`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("storage io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("invalid blob key {key:?}: {reason}")]
  InvalidKey { key: String, reason: &'static str },

  #[error("malformed locator: {0:?}")]
  MalformedLocator(String),

  #[error("{0}")]
  UnknownCategory(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
