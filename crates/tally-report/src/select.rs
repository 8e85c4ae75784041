//! Submission Selector — stage two of the pipeline.

use std::collections::BTreeMap;

use tally_core::{store::ReportStore, submission::Submission};

use crate::error::{Error, Result};

/// The single latest non-draft, non-deleted submission for every
/// (program, period) pair drawn from the two id sets, keyed by
/// `(program_id, period_id)`.
///
/// Pairs with no qualifying submission are simply absent. The underlying
/// store query is one bulk statement; the `BTreeMap` gives callers a
/// deterministic iteration order, which keeps assembled reports
/// byte-stable across identical runs.
pub async fn select_latest<S: ReportStore>(
  store: &S,
  program_ids: &[i64],
  period_ids: &[i64],
) -> Result<BTreeMap<(i64, i64), Submission>> {
  let submissions = store
    .latest_submissions(program_ids, period_ids)
    .await
    .map_err(Error::store)?;

  let mut map = BTreeMap::new();
  for submission in submissions {
    let key = (submission.program_id, submission.period_id);
    let previous = map.insert(key, submission);
    // The store contract guarantees at most one row per pair.
    debug_assert!(previous.is_none(), "duplicate selection for {key:?}");
  }
  Ok(map)
}
