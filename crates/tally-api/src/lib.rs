//! JSON HTTP API for the Tally reporting pipeline.
//!
//! Exposes an axum [`Router`] backed by any
//! [`tally_core::store::ReportStore`]. Four endpoints, all under `/api`:
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | `GET`  | `/api/report-data` | any session |
//! | `GET`  | `/api/gantt-data` | any session |
//! | `GET`  | `/api/program-targets` | any session |
//! | `POST` | `/api/reports/generate` | admin |
//!
//! Authentication is HTTP Basic against the two configured principals; see
//! [`auth`].

pub mod auth;
pub mod error;
pub mod gantt;
pub mod generate;
pub mod params;
pub mod report;
pub mod targets;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tally_core::store::ReportStore;

use auth::AuthConfig;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  pub admin_username:       String,
  /// PHC string; generate with `server --hash-password`.
  pub admin_password_hash:  String,
  pub agency_username:      String,
  pub agency_password_hash: String,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ReportStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ReportStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/api/report-data", get(report::handler::<S>))
    .route("/api/gantt-data", get(gantt::handler::<S>))
    .route("/api/program-targets", get(targets::handler::<S>))
    .route("/api/reports/generate", post(generate::handler::<S>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────
