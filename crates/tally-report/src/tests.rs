//! Integration tests for the aggregation pipeline against an in-memory
//! SQLite store.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use tally_core::{
  period::{PeriodType, ReportingPeriod},
  program::{Initiative, Program, Sector},
  submission::Submission,
  target::{NO_STATUS_PLACEHOLDER, TargetRow},
  user::{User, UserRole},
};
use tally_store_sqlite::SqliteStore;

use crate::{
  Error, GanttParams, ProgramFilter, ReportParams, assemble_report, build_gantt,
  collect_program_targets, resolve_periods,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dt(s: &str) -> DateTime<Utc> {
  DateTime::parse_from_rfc3339(s)
    .unwrap()
    .with_timezone(&Utc)
}

fn quarter(id: i64, number: u8, year: i32) -> ReportingPeriod {
  let start_month = (number as u32 - 1) * 3 + 1;
  ReportingPeriod {
    id,
    period_type: PeriodType::Quarter,
    period_number: number,
    year,
    start_date: date(year, start_month, 1),
    end_date: date(year, start_month + 2, 28),
  }
}

fn half(id: i64, number: u8, year: i32) -> ReportingPeriod {
  ReportingPeriod {
    id,
    period_type: PeriodType::Half,
    period_number: number,
    year,
    start_date: date(year, if number == 1 { 1 } else { 7 }, 1),
    end_date: date(year, if number == 1 { 6 } else { 12 }, 28),
  }
}

fn program(id: i64, name: &str) -> Program {
  Program {
    id,
    name: name.to_string(),
    number: None,
    sector_id: 1,
    initiative_id: None,
    owner_agency_id: 1,
    rating: None,
    start_date: None,
    end_date: None,
  }
}

fn submission(id: i64, program_id: i64, period_id: i64, content: &str) -> Submission {
  Submission {
    id,
    program_id,
    period_id,
    is_draft: false,
    is_submitted: true,
    is_deleted: false,
    // Spread dates so ids never collide on timestamp unless a test wants it.
    submission_date: dt("2025-04-01T10:00:00+00:00") + chrono::Duration::hours(id),
    content_json: (!content.is_empty()).then(|| content.to_string()),
  }
}

/// 2025 Q1 (id 10), Q2 (id 11), and H1 (id 12); one sector; program 5 with
/// a submission in each quarter, one per legacy payload shape.
async fn seed_half_year_scenario(s: &SqliteStore) {
  s.insert_sector(&Sector { id: 1, name: "Forestry".into() })
    .await
    .unwrap();
  s.insert_period(&quarter(10, 1, 2025)).await.unwrap();
  s.insert_period(&quarter(11, 2, 2025)).await.unwrap();
  s.insert_period(&half(12, 1, 2025)).await.unwrap();
  s.insert_program(&program(5, "Tree planting")).await.unwrap();
  s.insert_submission(&submission(
    1,
    5,
    10,
    r#"{"targets":[{"target_text":"Plant 100 trees","status_description":"in progress"}]}"#,
  ))
  .await
  .unwrap();
  s.insert_submission(&submission(2, 5, 11, r#"{"target":"Plant 200 trees"}"#))
    .await
    .unwrap();
}

fn report_params(period_id: i64) -> ReportParams {
  ReportParams {
    period_id,
    sector_id: 1,
    program_filter: None,
    target_filter: None,
  }
}

// ─── Period Resolver ─────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_quarter_contributes_only_itself() {
  let s = store().await;
  s.insert_period(&quarter(10, 1, 2025)).await.unwrap();

  let resolved = resolve_periods(&s, 10).await.unwrap();
  assert_eq!(resolved.anchor.id, 10);
  assert_eq!(resolved.contributing_ids(), [10]);
}

#[tokio::test]
async fn resolve_half_expands_to_anchor_plus_quarters() {
  let s = store().await;
  s.insert_period(&quarter(10, 1, 2025)).await.unwrap();
  s.insert_period(&quarter(11, 2, 2025)).await.unwrap();
  s.insert_period(&quarter(13, 3, 2025)).await.unwrap();
  s.insert_period(&quarter(14, 4, 2025)).await.unwrap();
  s.insert_period(&half(12, 1, 2025)).await.unwrap();
  s.insert_period(&half(15, 2, 2025)).await.unwrap();

  let h1 = resolve_periods(&s, 12).await.unwrap();
  assert_eq!(h1.contributing_ids(), [12, 10, 11]);

  let h2 = resolve_periods(&s, 15).await.unwrap();
  assert_eq!(h2.contributing_ids(), [15, 13, 14]);
}

#[tokio::test]
async fn resolve_half_without_siblings_degrades_to_anchor() {
  let s = store().await;
  s.insert_period(&half(12, 1, 2025)).await.unwrap();

  let resolved = resolve_periods(&s, 12).await.unwrap();
  assert_eq!(resolved.contributing_ids(), [12]);
}

#[tokio::test]
async fn resolve_unknown_period_is_not_found() {
  let s = store().await;
  let err = resolve_periods(&s, 404).await.unwrap_err();
  assert!(matches!(err, Error::PeriodNotFound(404)));
}

// ─── Report Assembler ────────────────────────────────────────────────────────

#[tokio::test]
async fn half_year_report_threads_ordinals_across_quarters() {
  let s = store().await;
  seed_half_year_scenario(&s).await;

  let doc = assemble_report(&s, &report_params(12)).await.unwrap();
  assert_eq!(doc.quarter_label, "H1 2025");
  assert_eq!(doc.programs.len(), 1);

  let p = &doc.programs[0];
  assert_eq!(p.program_id, 5);
  assert_eq!(p.targets.len(), 2);

  assert_eq!(p.targets[0].ordinal, 1);
  assert_eq!(p.targets[0].target_text, "Plant 100 trees");
  assert_eq!(p.targets[0].status_description, "in progress");
  assert_eq!(p.targets[0].period_label, "Q1 2025");
  assert_eq!(p.targets[0].source_period_id, 10);

  assert_eq!(p.targets[1].ordinal, 2);
  assert_eq!(p.targets[1].target_text, "Plant 200 trees");
  assert_eq!(p.targets[1].status_description, NO_STATUS_PLACEHOLDER);
  assert_eq!(p.targets[1].source_period_id, 11);
}

#[tokio::test]
async fn assembly_is_deterministic() {
  let s = store().await;
  seed_half_year_scenario(&s).await;
  s.insert_program(&program(6, "Agroforestry")).await.unwrap();
  s.insert_submission(&submission(3, 6, 10, r#"{"target":"A;B","status_text":"x"}"#))
    .await
    .unwrap();
  s.insert_user(&User {
    id:        1,
    name:      "Amal".to_string(),
    role:      UserRole::Focal,
    is_active: true,
  })
  .await
  .unwrap();

  let first = assemble_report(&s, &report_params(12)).await.unwrap();
  let second = assemble_report(&s, &report_params(12)).await.unwrap();
  assert_eq!(
    serde_json::to_string(&first).unwrap(),
    serde_json::to_string(&second).unwrap()
  );
}

#[tokio::test]
async fn target_filter_drops_and_reindexes() {
  let s = store().await;
  s.insert_sector(&Sector { id: 1, name: "Forestry".into() })
    .await
    .unwrap();
  s.insert_period(&quarter(10, 1, 2025)).await.unwrap();
  s.insert_program(&program(5, "Tree planting")).await.unwrap();
  s.insert_submission(&submission(
    1,
    5,
    10,
    r#"{"target":"A;B;C","status_text":"x;y;z"}"#,
  ))
  .await
  .unwrap();

  let mut params = report_params(10);
  params.target_filter = Some(BTreeMap::from([(5, vec![1, 3])]));

  let doc = assemble_report(&s, &params).await.unwrap();
  let targets = &doc.programs[0].targets;
  assert_eq!(targets.len(), 2);
  assert_eq!(targets[0].ordinal, 1);
  assert_eq!(targets[0].target_text, "A");
  assert_eq!(targets[0].status_description, "x");
  assert_eq!(targets[1].ordinal, 2);
  assert_eq!(targets[1].target_text, "C");
  assert_eq!(targets[1].status_description, "z");
}

#[tokio::test]
async fn period_without_submissions_yields_empty_programs() {
  let s = store().await;
  s.insert_sector(&Sector { id: 1, name: "Forestry".into() })
    .await
    .unwrap();
  s.insert_period(&quarter(10, 1, 2025)).await.unwrap();
  s.insert_program(&program(5, "Tree planting")).await.unwrap();

  let doc = assemble_report(&s, &report_params(10)).await.unwrap();
  assert!(doc.programs.is_empty());
}

#[tokio::test]
async fn explicit_orders_sort_programs_and_unmapped_go_last() {
  let s = store().await;
  s.insert_sector(&Sector { id: 1, name: "Forestry".into() })
    .await
    .unwrap();
  s.insert_period(&quarter(10, 1, 2025)).await.unwrap();
  for (id, name) in [(5, "Cedar"), (6, "Acacia"), (7, "Baobab")] {
    s.insert_program(&program(id, name)).await.unwrap();
    s.insert_submission(&submission(id, id, 10, r#"{"target":"t"}"#))
      .await
      .unwrap();
  }

  let mut params = report_params(10);
  // Cedar first, Acacia second; Baobab has no entry and must sort last.
  params.program_filter = Some(ProgramFilter {
    ids:    vec![5, 6, 7],
    orders: BTreeMap::from([(5, 1), (6, 2)]),
  });

  let doc = assemble_report(&s, &params).await.unwrap();
  let names: Vec<&str> = doc.programs.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, ["Cedar", "Acacia", "Baobab"]);
}

#[tokio::test]
async fn default_program_order_is_alphabetical() {
  let s = store().await;
  s.insert_sector(&Sector { id: 1, name: "Forestry".into() })
    .await
    .unwrap();
  s.insert_period(&quarter(10, 1, 2025)).await.unwrap();
  for (id, name) in [(5, "Cedar"), (6, "Acacia")] {
    s.insert_program(&program(id, name)).await.unwrap();
    s.insert_submission(&submission(id, id, 10, r#"{"target":"t"}"#))
      .await
      .unwrap();
  }

  let doc = assemble_report(&s, &report_params(10)).await.unwrap();
  let names: Vec<&str> = doc.programs.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, ["Acacia", "Cedar"]);
}

#[tokio::test]
async fn target_rows_take_precedence_over_content_json() {
  let s = store().await;
  s.insert_sector(&Sector { id: 1, name: "Forestry".into() })
    .await
    .unwrap();
  s.insert_period(&quarter(10, 1, 2025)).await.unwrap();
  s.insert_program(&program(5, "Tree planting")).await.unwrap();
  s.insert_submission(&submission(1, 5, 10, r#"{"target":"stale embedded"}"#))
    .await
    .unwrap();
  s.insert_target_row(&TargetRow {
    id:                 1,
    submission_id:      1,
    target_number:      1,
    target_text:        "Row target".to_string(),
    status_indicator:   Some("on-track".to_string()),
    status_description: None,
    start_date:         None,
    end_date:           None,
  })
  .await
  .unwrap();

  let doc = assemble_report(&s, &report_params(10)).await.unwrap();
  let targets = &doc.programs[0].targets;
  assert_eq!(targets.len(), 1);
  assert_eq!(targets[0].target_text, "Row target");
  assert_eq!(targets[0].status_description, NO_STATUS_PLACEHOLDER);
}

#[tokio::test]
async fn malformed_payload_degrades_to_no_targets() {
  let s = store().await;
  s.insert_sector(&Sector { id: 1, name: "Forestry".into() })
    .await
    .unwrap();
  s.insert_period(&quarter(10, 1, 2025)).await.unwrap();
  s.insert_program(&program(5, "Tree planting")).await.unwrap();
  s.insert_submission(&submission(1, 5, 10, "definitely not json"))
    .await
    .unwrap();

  let doc = assemble_report(&s, &report_params(10)).await.unwrap();
  // The program reported, so it appears; its payload contributed nothing.
  assert_eq!(doc.programs.len(), 1);
  assert!(doc.programs[0].targets.is_empty());
}

#[tokio::test]
async fn outcomes_and_sector_leads_are_merged() {
  let s = store().await;
  seed_half_year_scenario(&s).await;
  s.insert_user(&User {
    id:        1,
    name:      "Zoe".to_string(),
    role:      UserRole::Agency,
    is_active: true,
  })
  .await
  .unwrap();
  s.insert_user(&User {
    id:        2,
    name:      "Amal".to_string(),
    role:      UserRole::Focal,
    is_active: true,
  })
  .await
  .unwrap();
  s.insert_outcome(&tally_core::outcome::Outcome {
    id:           1,
    code:         "area_planted".to_string(),
    outcome_type: "chart".to_string(),
    title:        "Area planted".to_string(),
    data:         serde_json::json!({ "series": [5, 9] }),
    updated_at:   dt("2025-02-01T00:00:00+00:00"),
  })
  .await
  .unwrap();

  let doc = assemble_report(&s, &report_params(12)).await.unwrap();
  assert_eq!(doc.sector_leads, "Amal, Zoe");
  assert_eq!(doc.report_title, "Forestry Report - H1 2025");
  let outcome = doc.outcomes.get("area_planted").unwrap();
  assert_eq!(outcome.data, serde_json::json!({ "series": [5, 9] }));
}

#[tokio::test]
async fn unknown_sector_is_not_found() {
  let s = store().await;
  s.insert_period(&quarter(10, 1, 2025)).await.unwrap();
  let err = assemble_report(&s, &report_params(10)).await.unwrap_err();
  assert!(matches!(err, Error::SectorNotFound(1)));
}

// ─── Target-selection support ────────────────────────────────────────────────

#[tokio::test]
async fn program_targets_keeps_programs_without_submissions() {
  let s = store().await;
  seed_half_year_scenario(&s).await;
  s.insert_program(&program(6, "Agroforestry")).await.unwrap();

  let listed = collect_program_targets(&s, 12, &[5, 6]).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].name, "Agroforestry");
  assert!(listed[0].targets.is_empty());
  assert_eq!(listed[1].name, "Tree planting");
  assert_eq!(listed[1].targets.len(), 2);
}

// ─── Gantt builder ───────────────────────────────────────────────────────────

async fn seed_gantt(s: &SqliteStore) {
  s.insert_sector(&Sector { id: 1, name: "Forestry".into() })
    .await
    .unwrap();
  s.insert_period(&quarter(10, 1, 2025)).await.unwrap();
  s.insert_initiative(&Initiative {
    id:         1,
    name:       "Green Belt".to_string(),
    number:     Some("3".to_string()),
    start_date: Some(date(2024, 1, 1)),
    end_date:   Some(date(2026, 12, 31)),
  })
  .await
  .unwrap();

  let mut p5 = program(5, "Tree planting");
  p5.initiative_id = Some(1);
  p5.rating = Some("Completed".to_string());
  s.insert_program(&p5).await.unwrap();

  let mut p6 = program(6, "Agroforestry");
  p6.initiative_id = Some(1);
  s.insert_program(&p6).await.unwrap();

  s.insert_submission(&submission(
    1,
    5,
    10,
    r#"{"target":"Plant trees","status_text":"achieved"}"#,
  ))
  .await
  .unwrap();
}

#[tokio::test]
async fn gantt_builds_initiative_program_target_tree() {
  let s = store().await;
  seed_gantt(&s).await;

  let gantt = build_gantt(&s, &GanttParams::default()).await.unwrap();
  let ids: Vec<&str> = gantt.data.iter().map(|t| t.id.as_str()).collect();
  assert_eq!(
    ids,
    ["initiative-1", "program-6", "program-5", "target-5-1"]
  );

  let by_id = |id: &str| gantt.data.iter().find(|t| t.id == id).unwrap();
  assert_eq!(by_id("initiative-1").parent, None);
  assert_eq!(by_id("program-5").parent.as_deref(), Some("initiative-1"));
  assert_eq!(by_id("target-5-1").parent.as_deref(), Some("program-5"));
  assert!(gantt.links.is_empty());

  // Completed keyword in the rating drives the program to 1.0; the
  // untouched sibling has never started.
  assert_eq!(by_id("program-5").progress, 1.0);
  assert_eq!(by_id("program-6").progress, 0.0);
  assert_eq!(by_id("target-5-1").progress, 1.0);
}

#[tokio::test]
async fn gantt_status_filter_keeps_matching_programs() {
  let s = store().await;
  seed_gantt(&s).await;

  let completed = build_gantt(
    &s,
    &GanttParams {
      status: Some("completed".to_string()),
      ..GanttParams::default()
    },
  )
  .await
  .unwrap();
  let ids: Vec<&str> = completed.data.iter().map(|t| t.id.as_str()).collect();
  assert_eq!(ids, ["initiative-1", "program-5", "target-5-1"]);
}

#[tokio::test]
async fn gantt_search_matches_program_names() {
  let s = store().await;
  seed_gantt(&s).await;

  let found = build_gantt(
    &s,
    &GanttParams {
      search: Some("agro".to_string()),
      ..GanttParams::default()
    },
  )
  .await
  .unwrap();
  let ids: Vec<&str> = found.data.iter().map(|t| t.id.as_str()).collect();
  assert_eq!(ids, ["initiative-1", "program-6"]);
}
