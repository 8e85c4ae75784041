//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as ISO 8601
//! (`YYYY-MM-DD`), enum discriminants as lowercase text, booleans as 0/1
//! integers.

use chrono::{DateTime, NaiveDate, Utc};
use tally_core::{
  outcome::Outcome,
  period::{PeriodType, ReportingPeriod},
  program::{Initiative, Program},
  submission::Submission,
  target::TargetRow,
  user::UserRole,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── PeriodType ──────────────────────────────────────────────────────────────

pub fn encode_period_type(t: PeriodType) -> &'static str {
  match t {
    PeriodType::Quarter => "quarter",
    PeriodType::Half => "half",
    PeriodType::Yearly => "yearly",
  }
}

pub fn decode_period_type(s: &str) -> Result<PeriodType> {
  match s {
    "quarter" => Ok(PeriodType::Quarter),
    "half" => Ok(PeriodType::Half),
    "yearly" => Ok(PeriodType::Yearly),
    other => Err(Error::UnknownDiscriminant {
      column: "period_type",
      value:  other.to_string(),
    }),
  }
}

// ─── UserRole ────────────────────────────────────────────────────────────────

pub fn encode_user_role(r: UserRole) -> &'static str {
  match r {
    UserRole::Admin => "admin",
    UserRole::Agency => "agency",
    UserRole::Focal => "focal",
  }
}

pub fn decode_user_role(s: &str) -> Result<UserRole> {
  match s {
    "admin" => Ok(UserRole::Admin),
    "agency" => Ok(UserRole::Agency),
    "focal" => Ok(UserRole::Focal),
    other => Err(Error::UnknownDiscriminant {
      column: "role",
      value:  other.to_string(),
    }),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `reporting_periods` row.
pub struct RawPeriod {
  pub period_id:     i64,
  pub period_type:   String,
  pub period_number: i64,
  pub year:          i64,
  pub start_date:    String,
  pub end_date:      String,
}

impl RawPeriod {
  pub fn into_period(self) -> Result<ReportingPeriod> {
    Ok(ReportingPeriod {
      id:            self.period_id,
      period_type:   decode_period_type(&self.period_type)?,
      period_number: self.period_number as u8,
      year:          self.year as i32,
      start_date:    decode_date(&self.start_date)?,
      end_date:      decode_date(&self.end_date)?,
    })
  }
}

/// Raw values read directly from an `initiatives` row.
pub struct RawInitiative {
  pub initiative_id: i64,
  pub name:          String,
  pub number:        Option<String>,
  pub start_date:    Option<String>,
  pub end_date:      Option<String>,
}

impl RawInitiative {
  pub fn into_initiative(self) -> Result<Initiative> {
    Ok(Initiative {
      id:         self.initiative_id,
      name:       self.name,
      number:     self.number,
      start_date: self.start_date.as_deref().map(decode_date).transpose()?,
      end_date:   self.end_date.as_deref().map(decode_date).transpose()?,
    })
  }
}

/// Raw values read directly from a `programs` row.
pub struct RawProgram {
  pub program_id:      i64,
  pub name:            String,
  pub number:          Option<String>,
  pub sector_id:       i64,
  pub initiative_id:   Option<i64>,
  pub owner_agency_id: i64,
  pub rating:          Option<String>,
  pub start_date:      Option<String>,
  pub end_date:        Option<String>,
}

impl RawProgram {
  pub fn into_program(self) -> Result<Program> {
    Ok(Program {
      id:              self.program_id,
      name:            self.name,
      number:          self.number,
      sector_id:       self.sector_id,
      initiative_id:   self.initiative_id,
      owner_agency_id: self.owner_agency_id,
      rating:          self.rating,
      start_date:      self.start_date.as_deref().map(decode_date).transpose()?,
      end_date:        self.end_date.as_deref().map(decode_date).transpose()?,
    })
  }
}

/// Raw values read directly from a `submissions` row.
pub struct RawSubmission {
  pub submission_id:   i64,
  pub program_id:      i64,
  pub period_id:       i64,
  pub is_draft:        bool,
  pub is_submitted:    bool,
  pub is_deleted:      bool,
  pub submission_date: String,
  pub content_json:    Option<String>,
}

impl RawSubmission {
  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      id:              self.submission_id,
      program_id:      self.program_id,
      period_id:       self.period_id,
      is_draft:        self.is_draft,
      is_submitted:    self.is_submitted,
      is_deleted:      self.is_deleted,
      submission_date: decode_dt(&self.submission_date)?,
      content_json:    self.content_json,
    })
  }
}

/// Raw values read directly from a `submission_targets` row.
pub struct RawTargetRow {
  pub target_id:          i64,
  pub submission_id:      i64,
  pub target_number:      i64,
  pub target_text:        String,
  pub status_indicator:   Option<String>,
  pub status_description: Option<String>,
  pub start_date:         Option<String>,
  pub end_date:           Option<String>,
}

impl RawTargetRow {
  pub fn into_target_row(self) -> Result<TargetRow> {
    Ok(TargetRow {
      id:                 self.target_id,
      submission_id:      self.submission_id,
      target_number:      self.target_number,
      target_text:        self.target_text,
      status_indicator:   self.status_indicator,
      status_description: self.status_description,
      start_date:         self.start_date.as_deref().map(decode_date).transpose()?,
      end_date:           self.end_date.as_deref().map(decode_date).transpose()?,
    })
  }
}

/// Raw values read directly from an `outcomes` row.
pub struct RawOutcome {
  pub outcome_id:   i64,
  pub code:         String,
  pub outcome_type: String,
  pub title:        String,
  pub data_json:    String,
  pub updated_at:   String,
}

impl RawOutcome {
  pub fn into_outcome(self) -> Result<Outcome> {
    Ok(Outcome {
      id:           self.outcome_id,
      code:         self.code,
      outcome_type: self.outcome_type,
      title:        self.title,
      data:         serde_json::from_str(&self.data_json)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}
