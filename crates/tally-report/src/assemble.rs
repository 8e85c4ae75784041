//! Report Assembler — stage four of the pipeline.
//!
//! Joins resolved periods, selected submissions, normalized targets, and the
//! flat lookups (outcomes, sector leads) into the nested document consumed
//! by the client-side slide generator.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tally_core::{
  outcome::Outcome,
  period::ReportingPeriod,
  program::Program,
  store::ReportStore,
  target::{NO_STATUS_PLACEHOLDER, NormalizedTarget},
};
use tally_targets::{TargetPayload, classify, normalize};

use crate::{
  error::{Error, Result},
  resolve::resolve_periods,
  select::select_latest,
};

// ─── Request parameters ──────────────────────────────────────────────────────

/// Client-specified restriction and ordering of the programs in a report.
#[derive(Debug, Clone, Default)]
pub struct ProgramFilter {
  /// Explicit program ids; when non-empty these replace the sector-wide
  /// candidate set.
  pub ids:    Vec<i64>,
  /// Explicit display order per program id. Programs without an entry sort
  /// last, alphabetically.
  pub orders: BTreeMap<i64, i64>,
}

/// Per-program allow-lists of target ordinals. Targets outside the list are
/// dropped and the survivors re-indexed contiguously.
pub type TargetFilter = BTreeMap<i64, Vec<u32>>;

#[derive(Debug, Clone)]
pub struct ReportParams {
  pub period_id:      i64,
  pub sector_id:      i64,
  pub program_filter: Option<ProgramFilter>,
  pub target_filter:  Option<TargetFilter>,
}

// ─── Output document ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramReport {
  pub program_id:    i64,
  pub name:          String,
  pub number:        Option<String>,
  pub rating:        Option<String>,
  pub initiative_id: Option<i64>,
  pub targets:       Vec<NormalizedTarget>,
}

/// The assembled report; serialises to the JSON document the slide
/// generator consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
  pub report_title:  String,
  /// Names of all active agency/focal users, joined with `", "`. The set
  /// is system-wide despite the field name; see
  /// [`ReportStore::sector_lead_names`].
  pub sector_leads:  String,
  pub quarter_label: String,
  pub programs:      Vec<ProgramReport>,
  pub outcomes:      BTreeMap<String, Outcome>,
  pub draft_date:    NaiveDate,
}

/// One program's aggregated targets, as served to the target-selection UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramTargets {
  pub program_id: i64,
  pub name:       String,
  pub targets:    Vec<NormalizedTarget>,
}

// ─── Target gathering (shared with the gantt builder) ────────────────────────

pub(crate) struct GatheredProgram {
  pub program:        Program,
  pub targets:        Vec<NormalizedTarget>,
  /// Whether any contributing period had a qualifying submission. Programs
  /// without one are omitted from assembled reports.
  pub had_submission: bool,
}

/// Select latest submissions for `programs` across `periods` (one bulk
/// query), then normalize each program's targets with the ordinal counter
/// threading across periods.
///
/// `periods` must be in the order targets should be numbered — chronological
/// for reports and gantt alike.
pub(crate) async fn gather_targets<S: ReportStore>(
  store: &S,
  periods: &[ReportingPeriod],
  programs: &[Program],
) -> Result<Vec<GatheredProgram>> {
  let program_ids: Vec<i64> = programs.iter().map(|p| p.id).collect();
  let period_ids: Vec<i64> = periods.iter().map(|p| p.id).collect();

  let selection = select_latest(store, &program_ids, &period_ids).await?;

  let submission_ids: Vec<i64> = selection.values().map(|s| s.id).collect();
  let mut rows_by_submission: BTreeMap<i64, Vec<_>> = BTreeMap::new();
  for row in store
    .submission_target_rows(&submission_ids)
    .await
    .map_err(Error::store)?
  {
    rows_by_submission.entry(row.submission_id).or_default().push(row);
  }

  let mut gathered = Vec::with_capacity(programs.len());
  for program in programs {
    let mut counter: u32 = 0;
    let mut targets = Vec::new();
    let mut had_submission = false;

    for period in periods {
      let Some(submission) = selection.get(&(program.id, period.id)) else {
        continue;
      };
      had_submission = true;
      let label = period.label();

      if let Some(rows) = rows_by_submission.get(&submission.id) {
        // Current format: the relation rows are authoritative and
        // anything embedded in content_json is ignored.
        for row in rows {
          counter += 1;
          targets.push(NormalizedTarget {
            ordinal:            counter,
            target_text:        row.target_text.clone(),
            status_description: row
              .status_description
              .as_deref()
              .map(str::trim)
              .filter(|s| !s.is_empty())
              .unwrap_or(NO_STATUS_PLACEHOLDER)
              .to_string(),
            period_label:       label.clone(),
            source_period_id:   period.id,
          });
        }
        continue;
      }

      let raw = submission.content_json.as_deref().unwrap_or("");
      let payload = match classify(raw) {
        Ok(p) => p,
        Err(e) => {
          tracing::warn!(
            submission_id = submission.id,
            program_id = program.id,
            period_id = period.id,
            error = %e,
            "unparseable target payload; submission contributes no targets"
          );
          TargetPayload::Empty
        }
      };
      targets.extend(normalize(&payload, &label, period.id, &mut counter));
    }

    gathered.push(GatheredProgram {
      program: program.clone(),
      targets,
      had_submission,
    });
  }

  Ok(gathered)
}

// ─── Assembly ────────────────────────────────────────────────────────────────

/// Assemble the full report document for a period and sector.
///
/// Programs come either from `program_filter.ids` or from the whole sector;
/// only programs with at least one qualifying submission appear in the
/// output. Errors are limited to unknown period/sector and backend
/// failures — bad data inside submissions degrades per target, never
/// failing the report.
pub async fn assemble_report<S: ReportStore>(
  store: &S,
  params: &ReportParams,
) -> Result<ReportDocument> {
  let resolved = resolve_periods(store, params.period_id).await?;

  let sector = store
    .get_sector(params.sector_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::SectorNotFound(params.sector_id))?;

  let explicit_ids = params
    .program_filter
    .as_ref()
    .map(|f| f.ids.as_slice())
    .filter(|ids| !ids.is_empty());
  let candidates = match explicit_ids {
    Some(ids) => store.programs_by_ids(ids).await.map_err(Error::store)?,
    None => store
      .programs_by_sector(params.sector_id)
      .await
      .map_err(Error::store)?,
  };

  let gathered = gather_targets(store, &resolved.contributing, &candidates).await?;

  let mut programs: Vec<ProgramReport> = gathered
    .into_iter()
    .filter(|g| g.had_submission)
    .map(|g| {
      let mut targets = g.targets;
      if let Some(allowed) = params
        .target_filter
        .as_ref()
        .and_then(|f| f.get(&g.program.id))
      {
        targets.retain(|t| allowed.contains(&t.ordinal));
        // Contiguous ordinals in the final output even though the
        // allow-list may have punched holes.
        for (i, target) in targets.iter_mut().enumerate() {
          target.ordinal = i as u32 + 1;
        }
      }
      ProgramReport {
        program_id:    g.program.id,
        name:          g.program.name,
        number:        g.program.number,
        rating:        g.program.rating,
        initiative_id: g.program.initiative_id,
        targets,
      }
    })
    .collect();

  sort_programs(&mut programs, params.program_filter.as_ref());

  let outcomes: BTreeMap<String, Outcome> = store
    .list_outcomes()
    .await
    .map_err(Error::store)?
    .into_iter()
    .map(|o| (o.code.clone(), o))
    .collect();

  let sector_leads = store
    .sector_lead_names()
    .await
    .map_err(Error::store)?
    .join(", ");

  let quarter_label = resolved.anchor.label();
  Ok(ReportDocument {
    report_title: format!("{} Report - {}", sector.name, quarter_label),
    sector_leads,
    quarter_label,
    programs,
    outcomes,
    draft_date: Utc::now().date_naive(),
  })
}

/// Order programs by the client-supplied order map when present, otherwise
/// alphabetically. Programs missing from a supplied map sort after all
/// mapped ones, alphabetically; each gets a data-quality warning.
fn sort_programs(programs: &mut [ProgramReport], filter: Option<&ProgramFilter>) {
  let orders = filter.map(|f| &f.orders).filter(|o| !o.is_empty());

  if let Some(orders) = orders {
    for program in programs.iter() {
      if !orders.contains_key(&program.program_id) {
        tracing::warn!(
          program_id = program.program_id,
          "program has no entry in the supplied order map; sorting it last"
        );
      }
    }
    programs.sort_by(|a, b| {
      let ka = orders.get(&a.program_id);
      let kb = orders.get(&b.program_id);
      match (ka, kb) {
        (Some(x), Some(y)) => x.cmp(y).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
      }
    });
  } else {
    programs.sort_by(|a, b| a.name.cmp(&b.name));
  }
}

// ─── Target-selection support ────────────────────────────────────────────────

/// Aggregate targets for an explicit program set, as consumed by the
/// report-builder's target-selection UI. Unlike [`assemble_report`] this
/// keeps programs without submissions (the UI lists them with an empty
/// target set) and applies no filters.
pub async fn collect_program_targets<S: ReportStore>(
  store: &S,
  period_id: i64,
  program_ids: &[i64],
) -> Result<Vec<ProgramTargets>> {
  let resolved = resolve_periods(store, period_id).await?;
  let mut programs = store
    .programs_by_ids(program_ids)
    .await
    .map_err(Error::store)?;
  programs.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

  let gathered = gather_targets(store, &resolved.contributing, &programs).await?;

  Ok(
    gathered
      .into_iter()
      .map(|g| ProgramTargets {
        program_id: g.program.id,
        name:       g.program.name,
        targets:    g.targets,
      })
      .collect(),
  )
}
