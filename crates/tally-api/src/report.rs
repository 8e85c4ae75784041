//! Handler for `GET /api/report-data`.
//!
//! | Parameter | Notes |
//! |-----------|-------|
//! | `period_id` | required |
//! | `sector_id` | required |
//! | `selected_program_ids` | optional CSV of program ids |
//! | `program_orders` | optional JSON map `{"<program_id>": <order>}` |
//! | `selected_targets` | optional JSON map `{"<program_id>": [<ordinal>]}` |
//!
//! The response is the assembled [`ReportDocument`](tally_report::ReportDocument),
//! pretty-printed. The downstream slide generator diffs report payloads by
//! text, so the formatting is part of the contract.

use axum::{
  extract::{Query, State},
  http::header,
  response::IntoResponse,
};
use serde::Deserialize;
use tally_core::store::ReportStore;
use tally_report::{ProgramFilter, ReportParams, assemble_report};

use crate::{
  AppState,
  auth::Session,
  error::ApiError,
  params::{parse_csv_ids, parse_order_map, parse_target_map, require_i64},
};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
  pub period_id:            Option<String>,
  pub sector_id:            Option<String>,
  pub selected_program_ids: Option<String>,
  pub program_orders:       Option<String>,
  pub selected_targets:     Option<String>,
}

impl ReportQuery {
  pub(crate) fn into_params(self) -> Result<ReportParams, ApiError> {
    let period_id = require_i64(self.period_id.as_deref(), "period_id")?;
    let sector_id = require_i64(self.sector_id.as_deref(), "sector_id")?;

    let ids = self
      .selected_program_ids
      .as_deref()
      .map(parse_csv_ids)
      .unwrap_or_default();
    let orders = self
      .program_orders
      .as_deref()
      .and_then(parse_order_map)
      .unwrap_or_default();
    let program_filter = (!ids.is_empty() || !orders.is_empty())
      .then_some(ProgramFilter { ids, orders });

    let target_filter = self.selected_targets.as_deref().and_then(parse_target_map);

    Ok(ReportParams {
      period_id,
      sector_id,
      program_filter,
      target_filter,
    })
  }
}

/// `GET /api/report-data?period_id=..&sector_id=..[&selected_program_ids=..]`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  _session: Session,
  Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReportStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let params = query.into_params()?;
  let doc = assemble_report(state.store.as_ref(), &params).await?;

  let body = serde_json::to_string_pretty(&doc)
    .map_err(|e| ApiError::Internal(Box::new(e)))?;
  Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeMap;

  fn query(
    period: Option<&str>,
    sector: Option<&str>,
    ids: Option<&str>,
    orders: Option<&str>,
    targets: Option<&str>,
  ) -> ReportQuery {
    ReportQuery {
      period_id:            period.map(str::to_string),
      sector_id:            sector.map(str::to_string),
      selected_program_ids: ids.map(str::to_string),
      program_orders:       orders.map(str::to_string),
      selected_targets:     targets.map(str::to_string),
    }
  }

  #[test]
  fn missing_required_params_reject() {
    let err = query(None, Some("1"), None, None, None)
      .into_params()
      .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(m) if m.contains("period_id")));

    let err = query(Some("10"), None, None, None, None)
      .into_params()
      .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(m) if m.contains("sector_id")));
  }

  #[test]
  fn filters_decode() {
    let params = query(
      Some("10"),
      Some("1"),
      Some("5,6"),
      Some(r#"{"5":2,"6":1}"#),
      Some(r#"{"5":[1,3]}"#),
    )
    .into_params()
    .unwrap();

    let filter = params.program_filter.unwrap();
    assert_eq!(filter.ids, vec![5, 6]);
    assert_eq!(filter.orders, BTreeMap::from([(5, 2), (6, 1)]));
    assert_eq!(
      params.target_filter.unwrap(),
      BTreeMap::from([(5, vec![1, 3])])
    );
  }

  #[test]
  fn malformed_optional_params_are_dropped() {
    let params = query(
      Some("10"),
      Some("1"),
      None,
      Some("{broken"),
      Some("{broken"),
    )
    .into_params()
    .unwrap();
    assert!(params.program_filter.is_none());
    assert!(params.target_filter.is_none());
  }
}
