//! Error types for `sculpt-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("{kind} exceeds the {limit}-byte limit ({actual} bytes)")]
  TooLarge {
    kind:   &'static str,
    actual: usize,
    limit:  usize,
  },

  #[error("no submission for {0:?}")]
  NotFound(String),

  #[error("blob storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("record store error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
