//! Handler for `POST /api/reports/generate` (admin only).

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;
use tally_core::{store::ReportStore, submission::NewGeneratedReport};
use tally_report::{ProgramFilter, ReportParams, assemble_report};

use crate::{AppState, auth::AdminSession, error::ApiError, params::keyed_by_id};

/// JSON body accepted by `POST /api/reports/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateBody {
  pub period_id:         i64,
  pub sector_id:         i64,
  #[serde(default)]
  pub selected_programs: Vec<SelectedProgram>,
  /// Map of program id (JSON object key, so a string) to kept target
  /// ordinals.
  #[serde(default)]
  pub selected_targets:  BTreeMap<String, Vec<u32>>,
}

#[derive(Debug, Deserialize)]
pub struct SelectedProgram {
  pub program_id: i64,
  pub order:      i64,
}

impl GenerateBody {
  fn into_params(self) -> ReportParams {
    let ids: Vec<i64> =
      self.selected_programs.iter().map(|p| p.program_id).collect();
    let orders: BTreeMap<i64, i64> = self
      .selected_programs
      .iter()
      .map(|p| (p.program_id, p.order))
      .collect();
    let program_filter =
      (!ids.is_empty()).then_some(ProgramFilter { ids, orders });

    let target_filter =
      Some(keyed_by_id(self.selected_targets)).filter(|m| !m.is_empty());

    ReportParams {
      period_id: self.period_id,
      sector_id: self.sector_id,
      program_filter,
      target_filter,
    }
  }
}

/// `POST /api/reports/generate`
///
/// Assembles the report with the submitted selection, records a
/// [`GeneratedReport`](tally_core::submission::GeneratedReport) row, and
/// returns `{"success": true, "data": <ReportDocument>}`. An unknown period
/// or sector in the body is a validation problem here, not a 404.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
  Json(body): Json<GenerateBody>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: ReportStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let params = body.into_params();
  let doc = assemble_report(state.store.as_ref(), &params)
    .await
    .map_err(|e| match e {
      tally_report::Error::PeriodNotFound(_)
      | tally_report::Error::SectorNotFound(_) => {
        ApiError::BadRequest(e.to_string())
      }
      tally_report::Error::Store(e) => ApiError::Internal(e),
    })?;

  let record = state
    .store
    .save_generated_report(NewGeneratedReport {
      period_id:   params.period_id,
      sector_id:   params.sector_id,
      report_name: doc.report_title.clone(),
    })
    .await
    .map_err(|e| ApiError::Internal(Box::new(e)))?;
  tracing::info!(
    report_id = record.id,
    period_id = params.period_id,
    sector_id = params.sector_id,
    "generated report recorded"
  );

  Ok(Json(json!({ "success": true, "data": doc })))
}
