//! Period Resolver — stage one of the pipeline.

use tally_core::{period::ReportingPeriod, store::ReportStore};

use crate::error::{Error, Result};

/// A requested period expanded into the periods that contribute data to it.
#[derive(Debug, Clone)]
pub struct ResolvedPeriods {
  /// The period the caller asked for.
  pub anchor:       ReportingPeriod,
  /// The anchor itself, followed by any rolled-up quarters in chronological
  /// order. Submissions may exist against any of these; aggregation walks
  /// them in this order so ordinals come out stable.
  pub contributing: Vec<ReportingPeriod>,
}

impl ResolvedPeriods {
  pub fn contributing_ids(&self) -> Vec<i64> {
    self.contributing.iter().map(|p| p.id).collect()
  }
}

/// Expand `period_id` into its contributing period set.
///
/// Quarters and yearly periods contribute only themselves. A half-year
/// additionally contributes the quarter periods it rolls up (H1: Q1+Q2,
/// H2: Q3+Q4, same year). Missing sibling quarters — an admin has not
/// created them yet — degrade to the anchor alone; that is a data-quality
/// warning, not an error.
pub async fn resolve_periods<S: ReportStore>(
  store: &S,
  period_id: i64,
) -> Result<ResolvedPeriods> {
  let anchor = store
    .get_period(period_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::PeriodNotFound(period_id))?;

  let mut contributing = vec![anchor.clone()];

  if let Some(quarter_numbers) = anchor.half_quarter_numbers() {
    let quarters = store
      .quarters_for_half(anchor.year, quarter_numbers)
      .await
      .map_err(Error::store)?;
    if quarters.len() < 2 {
      tracing::warn!(
        period_id,
        year = anchor.year,
        found = quarters.len(),
        "half-year period is missing sibling quarters; report will cover \
         the anchor period only"
      );
    }
    contributing.extend(quarters);
  }

  Ok(ResolvedPeriods { anchor, contributing })
}
