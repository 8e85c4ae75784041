//! Users, as far as the reporting pipeline cares: the names that feed the
//! "sector leads" line of a report. Account management is out of scope.

use serde::{Deserialize, Serialize};

/// The role discriminant stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
  Admin,
  Agency,
  Focal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:        i64,
  pub name:      String,
  pub role:      UserRole,
  pub is_active: bool,
}
