//! Programs and their groupings: sectors and initiatives.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A top-level grouping of programs; every program belongs to exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
  pub id:   i64,
  pub name: String,
}

/// An optional cross-sector grouping of programs sharing a timeline,
/// used for Gantt-style visualisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
  pub id:         i64,
  pub name:       String,
  /// Display number, e.g. `"3.2"`; free text in the source system.
  pub number:     Option<String>,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
}

/// A government program that agencies report against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
  pub id:              i64,
  pub name:            String,
  /// Display number, e.g. `"1.4"`; free text in the source system.
  pub number:          Option<String>,
  pub sector_id:       i64,
  pub initiative_id:   Option<i64>,
  pub owner_agency_id: i64,
  /// Program-level RAG rating string surfaced unchanged in reports,
  /// e.g. `"on-track"` or `"Completed"`.
  pub rating:          Option<String>,
  pub start_date:      Option<NaiveDate>,
  pub end_date:        Option<NaiveDate>,
}
