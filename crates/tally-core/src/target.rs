//! Targets — free-text goals plus status narratives attached to submissions.
//!
//! Two physical representations coexist. Newer submissions carry one
//! [`TargetRow`] per target in a dedicated relation; older ones embed
//! targets inside the submission's `content_json` in one of several
//! historical shapes, decoded by the `tally-targets` crate. Both normalise
//! to [`NormalizedTarget`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Status text emitted when a target carries no status narrative.
pub const NO_STATUS_PLACEHOLDER: &str = "No status update available";

/// The uniform target shape consumed by report assembly and the client
/// slide generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTarget {
  /// 1-based position within the program's aggregated target list. The
  /// counter threads across all of a program's contributing periods, so
  /// ordinals stay unique per program even when several submissions feed
  /// one report.
  pub ordinal:            u32,
  pub target_text:        String,
  pub status_description: String,
  /// Label of the period the source submission belongs to, e.g. `"Q1 2025"`.
  pub period_label:       String,
  pub source_period_id:   i64,
}

/// One row of the current-format `submission_targets` relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRow {
  pub id:                 i64,
  pub submission_id:      i64,
  /// Author-assigned position within the submission.
  pub target_number:      i64,
  pub target_text:        String,
  /// RAG-style indicator, e.g. `"on-track"`; distinct from the narrative.
  pub status_indicator:   Option<String>,
  pub status_description: Option<String>,
  pub start_date:         Option<NaiveDate>,
  pub end_date:           Option<NaiveDate>,
}
