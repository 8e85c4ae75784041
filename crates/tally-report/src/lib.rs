//! The report-data aggregation pipeline.
//!
//! Four sequential stages, each independent and composable, all generic
//! over any [`tally_core::store::ReportStore`]:
//!
//! 1. [`resolve::resolve_periods`] — expand a requested period into the
//!    concrete set of periods that contribute data (a half-year rolls up
//!    its two quarters).
//! 2. [`select::select_latest`] — the single latest non-draft submission
//!    per (program, period) pair, deterministic under timestamp ties.
//! 3. target normalization — delegated to the `tally-targets` crate, with
//!    current-format target rows taking precedence.
//! 4. [`assemble::assemble_report`] — join everything into the nested
//!    document the client slide generator consumes.
//!
//! [`gantt::build_gantt`] reuses stages 1–3 to build the
//! initiative/program/target tree for the timeline widget.
//!
//! Data-quality problems (malformed payloads, unmapped program orders,
//! missing half-year siblings) degrade with a `tracing::warn!`; one bad
//! submission never fails a whole report.

pub mod assemble;
pub mod error;
pub mod gantt;
pub mod resolve;
pub mod select;

#[cfg(test)]
mod tests;

pub use assemble::{
  ProgramFilter, ProgramReport, ProgramTargets, ReportDocument, ReportParams,
  TargetFilter, assemble_report, collect_program_targets,
};
pub use error::{Error, Result};
pub use gantt::{GanttData, GanttParams, GanttTask, build_gantt};
pub use resolve::{ResolvedPeriods, resolve_periods};
pub use select::select_latest;
