//! Error type for `tally-targets`.
//!
//! Classification failures are data-quality signals, not fatal conditions:
//! callers log them and carry on with an empty target list.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("payload is not valid JSON: {0}")]
  Json(#[from] serde_json::Error),

  /// The payload parsed as JSON but matches none of the known shapes.
  #[error("unrecognised payload shape: {0}")]
  UnrecognisedShape(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
