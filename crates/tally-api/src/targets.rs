//! Handler for `GET /api/program-targets`.
//!
//! Serves the report builder's target-selection step: every aggregated
//! target for the requested programs, each marked `"selected": true` (the
//! client starts with everything ticked and the user deselects).

use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tally_core::{store::ReportStore, target::NormalizedTarget};
use tally_report::collect_program_targets;

use crate::{
  AppState,
  auth::Session,
  error::ApiError,
  params::{parse_csv_ids, require_i64},
};

#[derive(Debug, Deserialize)]
pub struct TargetsQuery {
  pub period_id:            Option<String>,
  pub selected_program_ids: Option<String>,
}

#[derive(Debug, Serialize)]
struct SelectableTarget {
  #[serde(flatten)]
  target:   NormalizedTarget,
  selected: bool,
}

/// `GET /api/program-targets?period_id=..&selected_program_ids=1,2`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  _session: Session,
  Query(query): Query<TargetsQuery>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: ReportStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let period_id = require_i64(query.period_id.as_deref(), "period_id")?;
  let program_ids = query
    .selected_program_ids
    .as_deref()
    .map(parse_csv_ids)
    .unwrap_or_default();

  let programs =
    collect_program_targets(state.store.as_ref(), period_id, &program_ids)
      .await?;

  let programs: Vec<serde_json::Value> = programs
    .into_iter()
    .map(|p| {
      let targets: Vec<SelectableTarget> = p
        .targets
        .into_iter()
        .map(|target| SelectableTarget { target, selected: true })
        .collect();
      json!({
        "program_id": p.program_id,
        "name": p.name,
        "targets": targets,
      })
    })
    .collect();

  Ok(Json(json!({ "programs": programs })))
}
