//! Gantt tree builder — the initiative → program → target task list served
//! to the client timeline widget.
//!
//! Progress fractions are existing business policy, preserved as-is:
//! 0.0 not started, 0.3 started with no submissions, 0.5 in-progress
//! keyword match, 0.7 has submissions, 1.0 completed/achieved keyword
//! match.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tally_core::{program::Program, store::ReportStore};

use crate::{
  assemble::{GatheredProgram, gather_targets},
  error::{Error, Result},
};

// ─── Progress policy ─────────────────────────────────────────────────────────

pub const PROGRESS_NOT_STARTED: f64 = 0.0;
pub const PROGRESS_STARTED_NO_SUBMISSION: f64 = 0.3;
pub const PROGRESS_IN_PROGRESS: f64 = 0.5;
pub const PROGRESS_HAS_SUBMISSIONS: f64 = 0.7;
pub const PROGRESS_COMPLETED: f64 = 1.0;

const COMPLETED_KEYWORDS: [&str; 2] = ["completed", "achieved"];
const IN_PROGRESS_KEYWORDS: [&str; 3] = ["in progress", "on track", "ongoing"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
  needles.iter().any(|n| haystack.contains(n))
}

/// Compute a program's progress fraction from its rating, the status text
/// of its reported targets, and whether it has started at all.
fn program_progress(
  program: &Program,
  had_submission: bool,
  status_text: &str,
  today: NaiveDate,
) -> f64 {
  if contains_any(status_text, &COMPLETED_KEYWORDS) {
    return PROGRESS_COMPLETED;
  }
  if contains_any(status_text, &IN_PROGRESS_KEYWORDS) {
    return PROGRESS_IN_PROGRESS;
  }
  if had_submission {
    return PROGRESS_HAS_SUBMISSIONS;
  }
  if program.start_date.is_some_and(|d| d <= today) {
    return PROGRESS_STARTED_NO_SUBMISSION;
  }
  PROGRESS_NOT_STARTED
}

/// A reported target's own progress, from its status narrative. A target
/// only exists because a submission carried it, so the floor is the
/// has-submissions fraction.
fn target_progress(status: &str) -> f64 {
  let status = status.to_lowercase();
  if contains_any(&status, &COMPLETED_KEYWORDS) {
    PROGRESS_COMPLETED
  } else if contains_any(&status, &IN_PROGRESS_KEYWORDS) {
    PROGRESS_IN_PROGRESS
  } else {
    PROGRESS_HAS_SUBMISSIONS
  }
}

// ─── Request / response types ────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct GanttParams {
  /// Restrict to a single initiative.
  pub initiative_id: Option<i64>,
  /// Case-insensitive substring filter on initiative and program names. A
  /// matching initiative keeps all of its programs; otherwise only the
  /// matching programs are kept.
  pub search:        Option<String>,
  /// Filter programs by computed progress bucket:
  /// `"not_started"`, `"in_progress"`, or `"completed"`.
  pub status:        Option<String>,
}

/// One row of the task tree, in the shape the timeline widget expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttTask {
  /// `"initiative-3"`, `"program-5"`, or `"target-5-2"`.
  pub id:         String,
  pub text:       String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start_date: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub end_date:   Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parent:     Option<String>,
  pub progress:   f64,
  #[serde(rename = "type")]
  pub task_type:  &'static str,
  pub open:       bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttData {
  pub data:  Vec<GanttTask>,
  /// Always empty: the tree carries no dependency edges, but the widget
  /// requires the key.
  pub links: Vec<serde_json::Value>,
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Build the initiative → program → target task tree.
///
/// Submissions are considered across all reporting periods (the gantt is
/// not period-scoped); selection and target normalization reuse the report
/// pipeline's stages, so the same latest-revision and ordinal rules apply.
pub async fn build_gantt<S: ReportStore>(
  store: &S,
  params: &GanttParams,
) -> Result<GanttData> {
  let mut initiatives = store.list_initiatives().await.map_err(Error::store)?;
  if let Some(id) = params.initiative_id {
    initiatives.retain(|i| i.id == id);
  }

  let periods = store.list_periods().await.map_err(Error::store)?;
  let search = params.search.as_deref().map(str::to_lowercase);
  let status_bucket = match params.status.as_deref() {
    None | Some("") => None,
    Some(s @ ("not_started" | "in_progress" | "completed")) => Some(s.to_string()),
    Some(other) => {
      tracing::warn!(status = other, "unknown gantt status filter; ignoring");
      None
    }
  };
  let today = Utc::now().date_naive();

  let mut data = Vec::new();

  for initiative in initiatives {
    let initiative_matches = search
      .as_deref()
      .is_none_or(|s| initiative.name.to_lowercase().contains(s));

    let mut programs = store
      .programs_by_initiative(initiative.id)
      .await
      .map_err(Error::store)?;
    if !initiative_matches {
      let s = search.as_deref().unwrap_or("");
      programs.retain(|p| p.name.to_lowercase().contains(s));
      if programs.is_empty() {
        continue;
      }
    }

    let gathered = gather_targets(store, &periods, &programs).await?;

    let mut program_tasks = Vec::new();
    let mut progress_sum = 0.0;
    for g in &gathered {
      let progress = gathered_progress(g, today);
      if let Some(bucket) = &status_bucket
        && progress_bucket(progress) != bucket
      {
        continue;
      }
      progress_sum += progress;
      program_tasks.push((g, progress));
    }

    // With a status filter active, drop initiatives left with no visible
    // programs; the single-initiative view still shows its empty root.
    if program_tasks.is_empty()
      && status_bucket.is_some()
      && params.initiative_id.is_none()
    {
      continue;
    }

    let initiative_task_id = format!("initiative-{}", initiative.id);
    let initiative_progress = if program_tasks.is_empty() {
      PROGRESS_NOT_STARTED
    } else {
      progress_sum / program_tasks.len() as f64
    };
    data.push(GanttTask {
      id:         initiative_task_id.clone(),
      text:       initiative.name.clone(),
      start_date: initiative.start_date,
      end_date:   initiative.end_date,
      parent:     None,
      progress:   initiative_progress,
      task_type:  "project",
      open:       true,
    });

    for (g, progress) in program_tasks {
      let program_task_id = format!("program-{}", g.program.id);
      data.push(GanttTask {
        id:         program_task_id.clone(),
        text:       g.program.name.clone(),
        start_date: g.program.start_date,
        end_date:   g.program.end_date,
        parent:     Some(initiative_task_id.clone()),
        progress,
        task_type:  "task",
        open:       true,
      });

      for target in &g.targets {
        data.push(GanttTask {
          id:         format!("target-{}-{}", g.program.id, target.ordinal),
          text:       target.target_text.clone(),
          start_date: None,
          end_date:   None,
          parent:     Some(program_task_id.clone()),
          progress:   target_progress(&target.status_description),
          task_type:  "task",
          open:       false,
        });
      }
    }
  }

  Ok(GanttData { data, links: Vec::new() })
}

fn gathered_progress(g: &GatheredProgram, today: NaiveDate) -> f64 {
  let mut status_text = g
    .program
    .rating
    .clone()
    .unwrap_or_default()
    .to_lowercase();
  for target in &g.targets {
    status_text.push(' ');
    status_text.push_str(&target.status_description.to_lowercase());
  }
  program_progress(&g.program, g.had_submission, &status_text, today)
}

fn progress_bucket(progress: f64) -> &'static str {
  if progress >= PROGRESS_COMPLETED {
    "completed"
  } else if progress > PROGRESS_NOT_STARTED {
    "in_progress"
  } else {
    "not_started"
  }
}
