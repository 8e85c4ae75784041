//! The `ReportStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! Higher layers (`tally-report`, `tally-api`) depend on this abstraction,
//! not on any concrete backend.
//!
//! Everything here is read-only except [`ReportStore::save_generated_report`]
//! (the one write in the reporting path: the metadata row recorded when an
//! admin generates a slide report). Bulk methods take id slices by design —
//! the latest-submission selection must be one query per call, never a loop
//! of per-program queries.

use std::future::Future;

use crate::{
  outcome::Outcome,
  period::ReportingPeriod,
  program::{Initiative, Program, Sector},
  submission::{GeneratedReport, NewGeneratedReport, Submission},
  target::TargetRow,
};

/// Abstraction over a Tally storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ReportStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Periods ───────────────────────────────────────────────────────────

  /// Retrieve a reporting period by id. Returns `None` if not found.
  fn get_period(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<ReportingPeriod>, Self::Error>> + Send + '_;

  /// All reporting periods, ordered by start date.
  fn list_periods(
    &self,
  ) -> impl Future<Output = Result<Vec<ReportingPeriod>, Self::Error>> + Send + '_;

  /// The quarter periods of `year` whose `period_number` is in
  /// `quarter_numbers`, ordered by period number. Used by the Period
  /// Resolver to expand a half-year into its contributing quarters; an
  /// empty result means the quarters have not been created yet.
  fn quarters_for_half(
    &self,
    year: i32,
    quarter_numbers: [u8; 2],
  ) -> impl Future<Output = Result<Vec<ReportingPeriod>, Self::Error>> + Send + '_;

  // ── Sectors / initiatives / programs ──────────────────────────────────

  /// Retrieve a sector by id. Returns `None` if not found.
  fn get_sector(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Sector>, Self::Error>> + Send + '_;

  /// All initiatives, ordered by name.
  fn list_initiatives(
    &self,
  ) -> impl Future<Output = Result<Vec<Initiative>, Self::Error>> + Send + '_;

  /// All programs in a sector, ordered by name.
  fn programs_by_sector(
    &self,
    sector_id: i64,
  ) -> impl Future<Output = Result<Vec<Program>, Self::Error>> + Send + '_;

  /// The programs with the given ids. Unknown ids are simply absent from
  /// the result; the order of the result is unspecified.
  fn programs_by_ids<'a>(
    &'a self,
    ids: &'a [i64],
  ) -> impl Future<Output = Result<Vec<Program>, Self::Error>> + Send + 'a;

  /// All programs linked to an initiative, ordered by name.
  fn programs_by_initiative(
    &self,
    initiative_id: i64,
  ) -> impl Future<Output = Result<Vec<Program>, Self::Error>> + Send + '_;

  // ── Submissions ───────────────────────────────────────────────────────

  /// For every (program, period) pair drawn from the two id sets that has
  /// at least one non-draft, non-deleted submission, return the single
  /// latest submission: maximum `submission_date`, ties broken by maximum
  /// `id`. At most one row per pair; pairs with no qualifying submission
  /// are absent.
  ///
  /// Implementations must resolve this in a single bulk query.
  fn latest_submissions<'a>(
    &'a self,
    program_ids: &'a [i64],
    period_ids: &'a [i64],
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + 'a;

  /// Current-format target rows for the given submissions, ordered by
  /// (submission id, target number). Submissions with no rows contribute
  /// nothing; their targets, if any, live in `content_json`.
  fn submission_target_rows<'a>(
    &'a self,
    submission_ids: &'a [i64],
  ) -> impl Future<Output = Result<Vec<TargetRow>, Self::Error>> + Send + 'a;

  // ── Lookups merged into reports ───────────────────────────────────────

  /// All outcomes, ordered by code.
  fn list_outcomes(
    &self,
  ) -> impl Future<Output = Result<Vec<Outcome>, Self::Error>> + Send + '_;

  /// Names of all active agency and focal users, ordered by name.
  ///
  /// Despite the name of the report field this feeds, the set is
  /// system-wide, not scoped to any sector; the source system behaved this
  /// way and downstream consumers expect it.
  fn sector_lead_names(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Record that a slide report was generated. `created_at` is set by the
  /// store.
  fn save_generated_report(
    &self,
    input: NewGeneratedReport,
  ) -> impl Future<Output = Result<GeneratedReport, Self::Error>> + Send + '_;
}
