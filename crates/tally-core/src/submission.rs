//! Program submissions — one agency's saved data for one program in one
//! period.
//!
//! Multiple rows may exist per (program, period): they are revision history.
//! Only the latest non-draft, non-deleted row is authoritative for
//! reporting; "latest" means maximum `submission_date` with maximum `id` as
//! the tie-break.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One saved revision of a program's data for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
  pub id:              i64,
  pub program_id:      i64,
  pub period_id:       i64,
  pub is_draft:        bool,
  pub is_submitted:    bool,
  /// Submissions are soft-deleted; deleted rows never qualify for reports.
  pub is_deleted:      bool,
  pub submission_date: DateTime<Utc>,
  /// Legacy free-form payload. May be absent, empty, or in any of several
  /// historical JSON shapes; see `tally-targets` for the decoder.
  pub content_json:    Option<String>,
}

/// Metadata row recorded when an admin generates a slide report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedReport {
  pub id:          i64,
  pub period_id:   i64,
  pub sector_id:   i64,
  pub report_name: String,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::ReportStore::save_generated_report`].
/// `created_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewGeneratedReport {
  pub period_id:   i64,
  pub sector_id:   i64,
  pub report_name: String,
}
