//! Error type for the aggregation pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("reporting period not found: {0}")]
  PeriodNotFound(i64),

  #[error("sector not found: {0}")]
  SectorNotFound(i64),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error. The pipeline is generic over the store, so the
  /// concrete error type is boxed at this boundary.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
