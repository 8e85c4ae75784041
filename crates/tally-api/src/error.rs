//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body is `{"error": "..."}`. Data-quality problems inside
//! submissions never surface here; they degrade inside the pipeline with a
//! warning.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden")]
  Forbidden,

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Unknown period/sector on the GET endpoints is a plain 404. The generate
/// endpoint maps the same pipeline errors to 400 instead; see
/// [`crate::generate`].
impl From<tally_report::Error> for ApiError {
  fn from(e: tally_report::Error) -> Self {
    match e {
      tally_report::Error::PeriodNotFound(id) => {
        ApiError::NotFound(format!("reporting period {id} not found"))
      }
      tally_report::Error::SectorNotFound(id) => {
        ApiError::NotFound(format!("sector {id} not found"))
      }
      tally_report::Error::Store(e) => ApiError::Internal(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, "unauthorized".to_string())
      }
      ApiError::Forbidden => (StatusCode::FORBIDDEN, "forbidden".to_string()),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "internal error");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"tally\""),
      );
    }
    res
  }
}
