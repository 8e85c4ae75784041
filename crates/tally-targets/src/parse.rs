//! Payload classification and target normalization.
//!
//! Pipeline:
//!   raw content_json &str
//!     └─ classify()  → TargetPayload (tagged union, decoded once)
//!          └─ normalize() → Vec<NormalizedTarget> (ordinal counter threads
//!             across calls within one program's aggregation)

use serde_json::Value;
use tally_core::target::{NO_STATUS_PLACEHOLDER, NormalizedTarget};

use crate::error::{Error, Result};

// ─── Tagged union ────────────────────────────────────────────────────────────

/// One element of the array-of-targets shape, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntry {
  pub text:   Option<String>,
  pub status: Option<String>,
}

/// The classified shape of a submission's `content_json` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetPayload {
  /// `{"targets": [{"target_text": ..., "status_description": ...}, ...]}`
  Array(Vec<TargetEntry>),
  /// `{"target": "...", "status_text": "..."}`; the target string may pack
  /// several targets separated by `;`.
  Single {
    target: String,
    status: Option<String>,
  },
  /// Empty, absent, or a shape that carries no targets.
  Empty,
}

// ─── Classification ──────────────────────────────────────────────────────────

/// Classify a raw `content_json` payload into a [`TargetPayload`].
///
/// Empty input, `"[]"`, and `"null"` are all [`TargetPayload::Empty`] — many
/// historical rows have no payload at all. Shape dispatch is in priority
/// order: the `targets` list first, then the single/legacy `target` key,
/// then Empty. Invalid JSON and a `targets` key that is not a list are
/// errors so the caller can log a data-quality warning, but callers are
/// expected to degrade to Empty rather than fail a report.
pub fn classify(raw: &str) -> Result<TargetPayload> {
  let trimmed = raw.trim();
  if trimmed.is_empty() || trimmed == "[]" || trimmed == "null" {
    return Ok(TargetPayload::Empty);
  }

  let value: Value = serde_json::from_str(trimmed)?;

  let Value::Object(map) = value else {
    // Scalars and bare arrays never carried targets in any known format.
    return Ok(TargetPayload::Empty);
  };

  if let Some(targets) = map.get("targets") {
    let Some(list) = targets.as_array() else {
      return Err(Error::UnrecognisedShape(
        "\"targets\" key is not a list".to_string(),
      ));
    };
    if list.is_empty() {
      return Ok(TargetPayload::Empty);
    }
    let entries = list
      .iter()
      .map(|el| TargetEntry {
        text:   str_field(el, "target_text").or_else(|| str_field(el, "text")),
        status: str_field(el, "status_description")
          .or_else(|| str_field(el, "status_text")),
      })
      .collect();
    return Ok(TargetPayload::Array(entries));
  }

  if let Some(target) = map.get("target").and_then(Value::as_str)
    && !target.trim().is_empty()
  {
    return Ok(TargetPayload::Single {
      target: target.to_string(),
      status: map
        .get("status_text")
        .and_then(Value::as_str)
        .map(str::to_string),
    });
  }

  Ok(TargetPayload::Empty)
}

fn str_field(el: &Value, key: &str) -> Option<String> {
  el.get(key).and_then(Value::as_str).map(str::to_string)
}

// ─── Normalization ───────────────────────────────────────────────────────────

/// Normalize a classified payload into uniform target records.
///
/// `counter` is the program-level ordinal counter. It threads across every
/// submission contributing to one program's aggregation, so a caller
/// walking several periods passes the same counter to each call and
/// ordinals stay sequential from 1 across the whole program. Never fails;
/// entries without usable text are skipped.
pub fn normalize(
  payload: &TargetPayload,
  period_label: &str,
  source_period_id: i64,
  counter: &mut u32,
) -> Vec<NormalizedTarget> {
  let mut out = Vec::new();

  match payload {
    TargetPayload::Array(entries) => {
      for entry in entries {
        let Some(text) = entry.text.as_deref().map(str::trim) else {
          continue;
        };
        if text.is_empty() {
          continue;
        }
        let status = entry
          .status
          .as_deref()
          .map(str::trim)
          .filter(|s| !s.is_empty())
          .unwrap_or(NO_STATUS_PLACEHOLDER);
        out.push(make_target(text, status, period_label, source_period_id, counter));
      }
    }

    TargetPayload::Single { target, status } => {
      if target.contains(';') {
        // Several targets packed into one string. Statuses pair with
        // target segments positionally; missing tail statuses default to
        // the placeholder.
        let statuses: Vec<&str> = status
          .as_deref()
          .unwrap_or("")
          .split(';')
          .map(str::trim)
          .collect();
        for (i, segment) in target.split(';').enumerate() {
          let text = segment.trim();
          if text.is_empty() {
            continue;
          }
          let status = statuses
            .get(i)
            .copied()
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_STATUS_PLACEHOLDER);
          out.push(make_target(text, status, period_label, source_period_id, counter));
        }
      } else {
        let text = target.trim();
        if !text.is_empty() {
          let status = status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_STATUS_PLACEHOLDER);
          out.push(make_target(text, status, period_label, source_period_id, counter));
        }
      }
    }

    TargetPayload::Empty => {}
  }

  out
}

/// Classify-then-normalize convenience. Malformed payloads yield an empty
/// list; callers that want to log the failure use [`classify`] directly.
pub fn normalize_content(
  raw: &str,
  period_label: &str,
  source_period_id: i64,
  counter: &mut u32,
) -> Vec<NormalizedTarget> {
  let payload = classify(raw).unwrap_or(TargetPayload::Empty);
  normalize(&payload, period_label, source_period_id, counter)
}

fn make_target(
  text: &str,
  status: &str,
  period_label: &str,
  source_period_id: i64,
  counter: &mut u32,
) -> NormalizedTarget {
  *counter += 1;
  NormalizedTarget {
    ordinal:            *counter,
    target_text:        repair_escapes(text),
    status_description: repair_escapes(status),
    period_label:       period_label.to_string(),
    source_period_id,
  }
}

/// Convert two-character literal escape sequences into real newlines.
///
/// The source system double-encoded on write, so stored text contains
/// literal `\n` / `\r` / `\r\n` character pairs rather than newline bytes.
fn repair_escapes(s: &str) -> String {
  s.replace("\\r\\n", "\n")
    .replace("\\n", "\n")
    .replace("\\r", "\n")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn run(raw: &str) -> Vec<NormalizedTarget> {
    let mut counter = 0;
    normalize_content(raw, "Q1 2025", 10, &mut counter)
  }

  #[test]
  fn array_shape_single_target() {
    let out =
      run(r#"{"targets":[{"target_text":"A","status_description":"ok"}]}"#);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].ordinal, 1);
    assert_eq!(out[0].target_text, "A");
    assert_eq!(out[0].status_description, "ok");
    assert_eq!(out[0].period_label, "Q1 2025");
    assert_eq!(out[0].source_period_id, 10);
  }

  #[test]
  fn single_shape_equivalent_to_array_shape() {
    let a = run(r#"{"targets":[{"target_text":"A","status_description":"ok"}]}"#);
    let b = run(r#"{"target":"A","status_text":"ok"}"#);
    assert_eq!(a, b);
  }

  #[test]
  fn array_shape_fallback_keys() {
    let out = run(r#"{"targets":[{"text":"B","status_text":"fine"}]}"#);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].target_text, "B");
    assert_eq!(out[0].status_description, "fine");
  }

  #[test]
  fn array_shape_missing_status_gets_placeholder() {
    let out = run(r#"{"targets":[{"target_text":"A"}]}"#);
    assert_eq!(out[0].status_description, NO_STATUS_PLACEHOLDER);
  }

  #[test]
  fn array_shape_skips_entries_without_text() {
    let out = run(
      r#"{"targets":[{"target_text":""},{"status_description":"x"},{"target_text":"C"}]}"#,
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].target_text, "C");
    assert_eq!(out[0].ordinal, 1);
  }

  #[test]
  fn semicolon_packing_splits_positionally() {
    let out = run(r#"{"target":"A;B;C","status_text":"x;y"}"#);
    assert_eq!(out.len(), 3);
    assert_eq!(
      out.iter().map(|t| t.target_text.as_str()).collect::<Vec<_>>(),
      ["A", "B", "C"]
    );
    assert_eq!(out[0].status_description, "x");
    assert_eq!(out[1].status_description, "y");
    assert_eq!(out[2].status_description, NO_STATUS_PLACEHOLDER);
    assert_eq!(
      out.iter().map(|t| t.ordinal).collect::<Vec<_>>(),
      [1, 2, 3]
    );
  }

  #[test]
  fn semicolon_packing_skips_empty_segments_but_keeps_status_pairing() {
    // The empty middle segment is dropped; "z" still pairs with "C" by
    // position in the original string.
    let out = run(r#"{"target":"A;;C","status_text":"x;y;z"}"#);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].target_text, "A");
    assert_eq!(out[0].status_description, "x");
    assert_eq!(out[1].target_text, "C");
    assert_eq!(out[1].status_description, "z");
  }

  #[test]
  fn malformed_and_empty_inputs_yield_nothing() {
    assert!(run("not json").is_empty());
    assert!(run("").is_empty());
    assert!(run("   ").is_empty());
    assert!(run("[]").is_empty());
    assert!(run("null").is_empty());
    assert!(run("42").is_empty());
    assert!(run(r#"{"narrative":"no targets here"}"#).is_empty());
    assert!(run(r#"{"targets":[]}"#).is_empty());
    assert!(run(r#"{"target":"   "}"#).is_empty());
  }

  #[test]
  fn targets_key_that_is_not_a_list_is_an_error_but_degrades() {
    assert!(matches!(
      classify(r#"{"targets":"oops"}"#),
      Err(Error::UnrecognisedShape(_))
    ));
    assert!(run(r#"{"targets":"oops"}"#).is_empty());
  }

  #[test]
  fn literal_escapes_become_newlines() {
    let out = run(
      r#"{"target":"line one\\nline two","status_text":"a\\r\\nb\\rc"}"#,
    );
    assert_eq!(out[0].target_text, "line one\nline two");
    assert_eq!(out[0].status_description, "a\nb\nc");
  }

  #[test]
  fn ordinal_counter_threads_across_calls() {
    let mut counter = 0;
    let first = normalize_content(
      r#"{"targets":[{"target_text":"A","status_description":"ok"}]}"#,
      "Q1 2025",
      10,
      &mut counter,
    );
    let second = normalize_content(
      r#"{"target":"B"}"#,
      "Q2 2025",
      11,
      &mut counter,
    );
    assert_eq!(first[0].ordinal, 1);
    assert_eq!(second[0].ordinal, 2);
    assert_eq!(second[0].period_label, "Q2 2025");
    assert_eq!(second[0].source_period_id, 11);
  }

  #[test]
  fn surrounding_whitespace_is_trimmed() {
    let out = run(r#"{"target":"  A  ","status_text":"  ok  "}"#);
    assert_eq!(out[0].target_text, "A");
    assert_eq!(out[0].status_description, "ok");
  }
}
