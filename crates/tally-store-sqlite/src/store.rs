//! [`SqliteStore`] — the SQLite implementation of [`ReportStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use tally_core::{
  outcome::Outcome,
  period::ReportingPeriod,
  program::{Initiative, Program, Sector},
  store::ReportStore,
  submission::{GeneratedReport, NewGeneratedReport, Submission},
  target::TargetRow,
  user::User,
};

use crate::{
  Error, Result,
  encode::{
    RawInitiative, RawOutcome, RawPeriod, RawProgram, RawSubmission,
    RawTargetRow, encode_date, encode_dt, encode_period_type, encode_user_role,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SQL fragments and row mappers ───────────────────────────────────────────

/// Render an `IN (...)` id list. Ids are integers formatted directly into
/// the SQL; rusqlite has no array binding and the values cannot carry
/// injection payloads.
fn id_list(ids: &[i64]) -> String {
  ids
    .iter()
    .map(|id| id.to_string())
    .collect::<Vec<_>>()
    .join(",")
}

const PERIOD_COLUMNS: &str =
  "period_id, period_type, period_number, year, start_date, end_date";

fn period_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPeriod> {
  Ok(RawPeriod {
    period_id:     row.get(0)?,
    period_type:   row.get(1)?,
    period_number: row.get(2)?,
    year:          row.get(3)?,
    start_date:    row.get(4)?,
    end_date:      row.get(5)?,
  })
}

const PROGRAM_COLUMNS: &str = "program_id, name, number, sector_id, \
   initiative_id, owner_agency_id, rating, start_date, end_date";

fn program_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawProgram> {
  Ok(RawProgram {
    program_id:      row.get(0)?,
    name:            row.get(1)?,
    number:          row.get(2)?,
    sector_id:       row.get(3)?,
    initiative_id:   row.get(4)?,
    owner_agency_id: row.get(5)?,
    rating:          row.get(6)?,
    start_date:      row.get(7)?,
    end_date:        row.get(8)?,
  })
}

const SUBMISSION_COLUMNS: &str = "submission_id, program_id, period_id, \
   is_draft, is_submitted, is_deleted, submission_date, content_json";

fn submission_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSubmission> {
  Ok(RawSubmission {
    submission_id:   row.get(0)?,
    program_id:      row.get(1)?,
    period_id:       row.get(2)?,
    is_draft:        row.get(3)?,
    is_submitted:    row.get(4)?,
    is_deleted:      row.get(5)?,
    submission_date: row.get(6)?,
    content_json:    row.get(7)?,
  })
}

// ─── ReportStore impl ────────────────────────────────────────────────────────

impl ReportStore for SqliteStore {
  type Error = Error;

  // ── Periods ───────────────────────────────────────────────────────────────

  async fn get_period(&self, id: i64) -> Result<Option<ReportingPeriod>> {
    let raw: Option<RawPeriod> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PERIOD_COLUMNS} FROM reporting_periods WHERE period_id = ?1"
              ),
              rusqlite::params![id],
              period_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPeriod::into_period).transpose()
  }

  async fn list_periods(&self) -> Result<Vec<ReportingPeriod>> {
    let raws: Vec<RawPeriod> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PERIOD_COLUMNS} FROM reporting_periods ORDER BY start_date, period_id"
        ))?;
        let rows = stmt
          .query_map([], period_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPeriod::into_period).collect()
  }

  async fn quarters_for_half(
    &self,
    year: i32,
    quarter_numbers: [u8; 2],
  ) -> Result<Vec<ReportingPeriod>> {
    let [a, b] = quarter_numbers.map(i64::from);

    let raws: Vec<RawPeriod> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PERIOD_COLUMNS} FROM reporting_periods
           WHERE year = ?1 AND period_type = 'quarter'
             AND period_number IN (?2, ?3)
           ORDER BY period_number"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![year as i64, a, b], period_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPeriod::into_period).collect()
  }

  // ── Sectors / initiatives / programs ──────────────────────────────────────

  async fn get_sector(&self, id: i64) -> Result<Option<Sector>> {
    let sector: Option<Sector> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT sector_id, name FROM sectors WHERE sector_id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(Sector {
                  id:   row.get(0)?,
                  name: row.get(1)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    Ok(sector)
  }

  async fn list_initiatives(&self) -> Result<Vec<Initiative>> {
    let raws: Vec<RawInitiative> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT initiative_id, name, number, start_date, end_date
           FROM initiatives ORDER BY name, initiative_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawInitiative {
              initiative_id: row.get(0)?,
              name:          row.get(1)?,
              number:        row.get(2)?,
              start_date:    row.get(3)?,
              end_date:      row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawInitiative::into_initiative).collect()
  }

  async fn programs_by_sector(&self, sector_id: i64) -> Result<Vec<Program>> {
    let raws: Vec<RawProgram> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROGRAM_COLUMNS} FROM programs
           WHERE sector_id = ?1 ORDER BY name, program_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![sector_id], program_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProgram::into_program).collect()
  }

  async fn programs_by_ids(&self, ids: &[i64]) -> Result<Vec<Program>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let in_list = id_list(ids);

    let raws: Vec<RawProgram> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROGRAM_COLUMNS} FROM programs WHERE program_id IN ({in_list})"
        ))?;
        let rows = stmt
          .query_map([], program_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProgram::into_program).collect()
  }

  async fn programs_by_initiative(&self, initiative_id: i64) -> Result<Vec<Program>> {
    let raws: Vec<RawProgram> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROGRAM_COLUMNS} FROM programs
           WHERE initiative_id = ?1 ORDER BY name, program_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![initiative_id], program_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProgram::into_program).collect()
  }

  // ── Submissions ───────────────────────────────────────────────────────────

  async fn latest_submissions(
    &self,
    program_ids: &[i64],
    period_ids: &[i64],
  ) -> Result<Vec<Submission>> {
    if program_ids.is_empty() || period_ids.is_empty() {
      return Ok(Vec::new());
    }
    let programs_in = id_list(program_ids);
    let periods_in = id_list(period_ids);

    // One window query for the whole id set: rank revisions within each
    // (program, period) partition, newest date first, highest id first on
    // date collisions, and keep only the top-ranked row.
    let raws: Vec<RawSubmission> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBMISSION_COLUMNS} FROM (
             SELECT {SUBMISSION_COLUMNS},
                    ROW_NUMBER() OVER (
                      PARTITION BY program_id, period_id
                      ORDER BY submission_date DESC, submission_id DESC
                    ) AS rn
             FROM submissions
             WHERE is_draft = 0 AND is_deleted = 0
               AND program_id IN ({programs_in})
               AND period_id IN ({periods_in})
           )
           WHERE rn = 1
           ORDER BY program_id, period_id"
        ))?;
        let rows = stmt
          .query_map([], submission_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubmission::into_submission).collect()
  }

  async fn submission_target_rows(
    &self,
    submission_ids: &[i64],
  ) -> Result<Vec<TargetRow>> {
    if submission_ids.is_empty() {
      return Ok(Vec::new());
    }
    let in_list = id_list(submission_ids);

    let raws: Vec<RawTargetRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT target_id, submission_id, target_number, target_text,
                  status_indicator, status_description, start_date, end_date
           FROM submission_targets
           WHERE submission_id IN ({in_list})
           ORDER BY submission_id, target_number, target_id"
        ))?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawTargetRow {
              target_id:          row.get(0)?,
              submission_id:      row.get(1)?,
              target_number:      row.get(2)?,
              target_text:        row.get(3)?,
              status_indicator:   row.get(4)?,
              status_description: row.get(5)?,
              start_date:         row.get(6)?,
              end_date:           row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTargetRow::into_target_row).collect()
  }

  // ── Lookups merged into reports ───────────────────────────────────────────

  async fn list_outcomes(&self) -> Result<Vec<Outcome>> {
    let raws: Vec<RawOutcome> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT outcome_id, code, outcome_type, title, data_json, updated_at
           FROM outcomes ORDER BY code",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawOutcome {
              outcome_id:   row.get(0)?,
              code:         row.get(1)?,
              outcome_type: row.get(2)?,
              title:        row.get(3)?,
              data_json:    row.get(4)?,
              updated_at:   row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOutcome::into_outcome).collect()
  }

  async fn sector_lead_names(&self) -> Result<Vec<String>> {
    let names: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT name FROM users
           WHERE is_active = 1 AND role IN ('agency', 'focal')
           ORDER BY name, user_id",
        )?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(names)
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn save_generated_report(
    &self,
    input: NewGeneratedReport,
  ) -> Result<GeneratedReport> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let period_id = input.period_id;
    let sector_id = input.sector_id;
    let report_name = input.report_name.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO generated_reports (period_id, sector_id, report_name, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![period_id, sector_id, report_name, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(GeneratedReport {
      id,
      period_id: input.period_id,
      sector_id: input.sector_id,
      report_name: input.report_name,
      created_at,
    })
  }
}

// ─── Write paths outside the reporting pipeline ──────────────────────────────

/// Row inserts used by the admin CRUD surface and by test fixtures. Ids are
/// caller-assigned (the source system managed explicit ids); the reporting
/// pipeline never calls these.
impl SqliteStore {
  pub async fn insert_period(&self, period: &ReportingPeriod) -> Result<()> {
    let p = period.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reporting_periods
             (period_id, period_type, period_number, year, start_date, end_date)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            p.id,
            encode_period_type(p.period_type),
            p.period_number as i64,
            p.year as i64,
            encode_date(p.start_date),
            encode_date(p.end_date),
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_sector(&self, sector: &Sector) -> Result<()> {
    let s = sector.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sectors (sector_id, name) VALUES (?1, ?2)",
          rusqlite::params![s.id, s.name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_initiative(&self, initiative: &Initiative) -> Result<()> {
    let i = initiative.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO initiatives (initiative_id, name, number, start_date, end_date)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            i.id,
            i.name,
            i.number,
            i.start_date.map(encode_date),
            i.end_date.map(encode_date),
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_program(&self, program: &Program) -> Result<()> {
    let p = program.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO programs
             (program_id, name, number, sector_id, initiative_id,
              owner_agency_id, rating, start_date, end_date)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            p.id,
            p.name,
            p.number,
            p.sector_id,
            p.initiative_id,
            p.owner_agency_id,
            p.rating,
            p.start_date.map(encode_date),
            p.end_date.map(encode_date),
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_user(&self, user: &User) -> Result<()> {
    let u = user.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, name, role, is_active)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![u.id, u.name, encode_user_role(u.role), u.is_active],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_submission(&self, submission: &Submission) -> Result<()> {
    let s = submission.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO submissions
             (submission_id, program_id, period_id, is_draft, is_submitted,
              is_deleted, submission_date, content_json)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            s.id,
            s.program_id,
            s.period_id,
            s.is_draft,
            s.is_submitted,
            s.is_deleted,
            encode_dt(s.submission_date),
            s.content_json,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_target_row(&self, target: &TargetRow) -> Result<()> {
    let t = target.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO submission_targets
             (target_id, submission_id, target_number, target_text,
              status_indicator, status_description, start_date, end_date)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            t.id,
            t.submission_id,
            t.target_number,
            t.target_text,
            t.status_indicator,
            t.status_description,
            t.start_date.map(encode_date),
            t.end_date.map(encode_date),
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_outcome(&self, outcome: &Outcome) -> Result<()> {
    let o = outcome.clone();
    let data_json = serde_json::to_string(&o.data)?;
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO outcomes
             (outcome_id, code, outcome_type, title, data_json, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            o.id,
            o.code,
            o.outcome_type,
            o.title,
            data_json,
            encode_dt(o.updated_at),
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
