//! Decoder for the historical target payloads of Tally submissions.
//!
//! Converts the loosely-schematized `content_json` blob attached to a
//! submission into uniform [`tally_core::target::NormalizedTarget`] records.
//! Pure synchronous; no HTTP or database dependencies.
//!
//! Three historical shapes coexist in production data:
//!
//! 1. `{"targets": [{"target_text": "...", "status_description": "..."}]}`
//! 2. `{"target": "...", "status_text": "..."}` — possibly several targets
//!    packed into the single string with `;` separators
//! 3. empty / `"[]"` / `null` / absent
//!
//! The payload is classified once into a [`TargetPayload`] tagged union at
//! this boundary; business logic never probes raw JSON shapes itself.
//!
//! # Quick start
//!
//! ```
//! use tally_targets::normalize_content;
//!
//! let mut counter = 0;
//! let targets = normalize_content(
//!   r#"{"target":"Plant 100 trees","status_text":"in progress"}"#,
//!   "Q1 2025",
//!   10,
//!   &mut counter,
//! );
//! assert_eq!(targets.len(), 1);
//! assert_eq!(targets[0].ordinal, 1);
//! ```

pub mod error;
mod parse;

pub use error::{Error, Result};
pub use parse::{TargetEntry, TargetPayload, classify, normalize, normalize_content};
