//! Reporting periods — the time windows agencies report against.
//!
//! A period is a quarter, a half-year, or a full year. Half-years are not
//! stored with links to their quarters; the mapping is business logic: H1
//! rolls up Q1 and Q2 of the same year, H2 rolls up Q3 and Q4.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The granularity of a reporting period. The variant name serves as the
/// `period_type` discriminant stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
  Quarter,
  Half,
  Yearly,
}

/// A time window against which agencies submit program data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
  pub id:            i64,
  pub period_type:   PeriodType,
  /// Q1–Q4 for quarters, 1 or 2 for half-years, always 1 for yearly.
  pub period_number: u8,
  pub year:          i32,
  pub start_date:    NaiveDate,
  pub end_date:      NaiveDate,
}

impl ReportingPeriod {
  /// Human-readable label used in report titles and on targets,
  /// e.g. `"Q1 2025"`, `"H2 2025"`, `"2025"`.
  pub fn label(&self) -> String {
    match self.period_type {
      PeriodType::Quarter => format!("Q{} {}", self.period_number, self.year),
      PeriodType::Half => format!("H{} {}", self.period_number, self.year),
      PeriodType::Yearly => self.year.to_string(),
    }
  }

  /// The quarter numbers that roll up into this period, if it is a
  /// half-year: H1 covers Q1 and Q2, H2 covers Q3 and Q4.
  ///
  /// Returns `None` for quarters and yearly periods, and for half-years
  /// with an out-of-range `period_number` (bad data, not a panic).
  pub fn half_quarter_numbers(&self) -> Option<[u8; 2]> {
    if self.period_type != PeriodType::Half {
      return None;
    }
    match self.period_number {
      1 => Some([1, 2]),
      2 => Some([3, 4]),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn period(period_type: PeriodType, number: u8, year: i32) -> ReportingPeriod {
    ReportingPeriod {
      id: 1,
      period_type,
      period_number: number,
      year,
      start_date: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
      end_date: NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
    }
  }

  #[test]
  fn labels() {
    assert_eq!(period(PeriodType::Quarter, 3, 2025).label(), "Q3 2025");
    assert_eq!(period(PeriodType::Half, 1, 2025).label(), "H1 2025");
    assert_eq!(period(PeriodType::Yearly, 1, 2025).label(), "2025");
  }

  #[test]
  fn half_quarter_mapping() {
    assert_eq!(
      period(PeriodType::Half, 1, 2025).half_quarter_numbers(),
      Some([1, 2])
    );
    assert_eq!(
      period(PeriodType::Half, 2, 2025).half_quarter_numbers(),
      Some([3, 4])
    );
    assert_eq!(period(PeriodType::Quarter, 1, 2025).half_quarter_numbers(), None);
    assert_eq!(period(PeriodType::Half, 9, 2025).half_quarter_numbers(), None);
  }
}
