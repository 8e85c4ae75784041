//! Lenient decoding of the stringly-typed query parameters the report
//! builder client sends.
//!
//! Required ids reject with 400. The optional CSV and JSON-map parameters
//! degrade instead: a malformed value is logged and treated as absent, and
//! malformed entries inside an otherwise valid map are skipped.

use std::collections::BTreeMap;

use crate::error::ApiError;

/// Decode a required integer parameter.
pub fn require_i64(value: Option<&str>, name: &str) -> Result<i64, ApiError> {
  let raw = value
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))?;
  raw
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("{name} must be an integer")))
}

/// Decode an optional integer parameter; a non-numeric value is logged and
/// treated as absent.
pub fn lenient_i64(value: Option<&str>, name: &str) -> Option<i64> {
  let raw = value.map(str::trim).filter(|s| !s.is_empty())?;
  match raw.parse() {
    Ok(id) => Some(id),
    Err(_) => {
      tracing::warn!(param = name, value = raw, "non-numeric id; ignoring");
      None
    }
  }
}

/// Decode a comma-separated id list. Empty and non-numeric segments are
/// skipped with a warning.
pub fn parse_csv_ids(raw: &str) -> Vec<i64> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .filter_map(|s| match s.parse() {
      Ok(id) => Some(id),
      Err(_) => {
        tracing::warn!(segment = s, "non-numeric id in CSV list; skipping");
        None
      }
    })
    .collect()
}

/// Decode a `{"<program_id>": <order>}` JSON map.
pub fn parse_order_map(raw: &str) -> Option<BTreeMap<i64, i64>> {
  let decoded: BTreeMap<String, i64> = match serde_json::from_str(raw) {
    Ok(m) => m,
    Err(e) => {
      tracing::warn!(error = %e, "malformed program_orders; ignoring");
      return None;
    }
  };
  Some(keyed_by_id(decoded))
}

/// Decode a `{"<program_id>": [<ordinal>, ...]}` JSON map.
pub fn parse_target_map(raw: &str) -> Option<BTreeMap<i64, Vec<u32>>> {
  let decoded: BTreeMap<String, Vec<u32>> = match serde_json::from_str(raw) {
    Ok(m) => m,
    Err(e) => {
      tracing::warn!(error = %e, "malformed selected_targets; ignoring");
      return None;
    }
  };
  Some(keyed_by_id(decoded))
}

/// Re-key a JSON object (string keys) by program id, skipping non-numeric
/// keys with a warning.
pub fn keyed_by_id<V>(map: BTreeMap<String, V>) -> BTreeMap<i64, V> {
  map
    .into_iter()
    .filter_map(|(k, v)| match k.trim().parse() {
      Ok(id) => Some((id, v)),
      Err(_) => {
        tracing::warn!(key = k, "non-numeric program id key; skipping entry");
        None
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn require_i64_rejects_missing_and_non_numeric() {
    assert_eq!(require_i64(Some("12"), "period_id").unwrap(), 12);
    assert!(matches!(
      require_i64(None, "period_id"),
      Err(ApiError::BadRequest(_))
    ));
    assert!(matches!(
      require_i64(Some(""), "period_id"),
      Err(ApiError::BadRequest(_))
    ));
    assert!(matches!(
      require_i64(Some("abc"), "period_id"),
      Err(ApiError::BadRequest(_))
    ));
  }

  #[test]
  fn csv_ids_skip_junk_segments() {
    assert_eq!(parse_csv_ids("1,2, 3"), vec![1, 2, 3]);
    assert_eq!(parse_csv_ids("1,,x,4"), vec![1, 4]);
    assert!(parse_csv_ids("").is_empty());
  }

  #[test]
  fn order_map_decodes_string_keys() {
    let m = parse_order_map(r#"{"5":1,"6":2}"#).unwrap();
    assert_eq!(m, BTreeMap::from([(5, 1), (6, 2)]));
  }

  #[test]
  fn malformed_maps_are_treated_as_absent() {
    assert!(parse_order_map("not json").is_none());
    assert!(parse_target_map("[1,2]").is_none());
  }

  #[test]
  fn non_numeric_map_keys_are_skipped() {
    let m = parse_target_map(r#"{"5":[1,2],"oops":[3]}"#).unwrap();
    assert_eq!(m, BTreeMap::from([(5, vec![1, 2])]));
  }
}
