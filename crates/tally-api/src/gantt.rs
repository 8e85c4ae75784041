//! Handler for `GET /api/gantt-data`.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use tally_core::store::ReportStore;
use tally_report::{GanttData, GanttParams, build_gantt};

use crate::{AppState, auth::Session, error::ApiError, params::lenient_i64};

#[derive(Debug, Deserialize)]
pub struct GanttQuery {
  pub initiative_id: Option<String>,
  pub search:        Option<String>,
  pub status:        Option<String>,
}

/// `GET /api/gantt-data[?initiative_id=..][&search=..][&status=..]`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  _session: Session,
  Query(query): Query<GanttQuery>,
) -> Result<Json<GanttData>, ApiError>
where
  S: ReportStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let params = GanttParams {
    initiative_id: lenient_i64(query.initiative_id.as_deref(), "initiative_id"),
    search:        query.search.filter(|s| !s.trim().is_empty()),
    status:        query.status.filter(|s| !s.trim().is_empty()),
  };
  let gantt = build_gantt(state.store.as_ref(), &params).await?;
  Ok(Json(gantt))
}
