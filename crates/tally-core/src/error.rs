//! Error types for `tally-core`.
//!
//! Error kinds are explicit variants so callers can branch without string
//! matching: not-found, validation, and serialization failures are distinct.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("reporting period not found: {0}")]
  PeriodNotFound(i64),

  #[error("sector not found: {0}")]
  SectorNotFound(i64),

  #[error("program not found: {0}")]
  ProgramNotFound(i64),

  #[error("invalid parameter: {0}")]
  Validation(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
