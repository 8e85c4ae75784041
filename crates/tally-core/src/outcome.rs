//! Outcomes — sector/program-level indicator data (charts, KPIs) shown
//! alongside program reporting. Managed independently of submissions and
//! merged into reports unmodified, keyed by `code`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
  pub id:           i64,
  /// Stable lookup key used by the client widgets, e.g. `"timber_exports"`.
  pub code:         String,
  /// Free-text kind discriminant, e.g. `"chart"` or `"kpi"`.
  pub outcome_type: String,
  pub title:        String,
  /// Opaque widget payload; the pipeline never interprets it.
  pub data:         serde_json::Value,
  pub updated_at:   DateTime<Utc>,
}
