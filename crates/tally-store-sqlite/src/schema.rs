//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`. The half-year/quarter relationship is deliberately
//! not stored: periods carry an explicit `period_type`/`period_number`, and
//! the rollup mapping lives in the Period Resolver.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS reporting_periods (
    period_id     INTEGER PRIMARY KEY,
    period_type   TEXT NOT NULL,       -- 'quarter' | 'half' | 'yearly'
    period_number INTEGER NOT NULL,    -- Q1-Q4, H1-H2, or 1 for yearly
    year          INTEGER NOT NULL,
    start_date    TEXT NOT NULL,       -- ISO 8601 date
    end_date      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sectors (
    sector_id INTEGER PRIMARY KEY,
    name      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS initiatives (
    initiative_id INTEGER PRIMARY KEY,
    name          TEXT NOT NULL,
    number        TEXT,
    start_date    TEXT,
    end_date      TEXT
);

CREATE TABLE IF NOT EXISTS users (
    user_id   INTEGER PRIMARY KEY,
    name      TEXT NOT NULL,
    role      TEXT NOT NULL,           -- 'admin' | 'agency' | 'focal'
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS programs (
    program_id      INTEGER PRIMARY KEY,
    name            TEXT NOT NULL,
    number          TEXT,
    sector_id       INTEGER NOT NULL REFERENCES sectors(sector_id),
    initiative_id   INTEGER REFERENCES initiatives(initiative_id),
    owner_agency_id INTEGER NOT NULL,
    rating          TEXT,
    start_date      TEXT,
    end_date        TEXT
);

-- Submissions are revision history: several rows may exist per
-- (program, period). Rows are soft-deleted, never removed.
CREATE TABLE IF NOT EXISTS submissions (
    submission_id   INTEGER PRIMARY KEY,
    program_id      INTEGER NOT NULL REFERENCES programs(program_id),
    period_id       INTEGER NOT NULL REFERENCES reporting_periods(period_id),
    is_draft        INTEGER NOT NULL DEFAULT 0,
    is_submitted    INTEGER NOT NULL DEFAULT 0,
    is_deleted      INTEGER NOT NULL DEFAULT 0,
    submission_date TEXT NOT NULL,     -- RFC 3339 UTC
    content_json    TEXT               -- legacy free-form target payload
);

-- Current-format targets, one row per target. When a submission has rows
-- here they take precedence over anything embedded in content_json.
CREATE TABLE IF NOT EXISTS submission_targets (
    target_id          INTEGER PRIMARY KEY,
    submission_id      INTEGER NOT NULL REFERENCES submissions(submission_id),
    target_number      INTEGER NOT NULL,
    target_text        TEXT NOT NULL,
    status_indicator   TEXT,
    status_description TEXT,
    start_date         TEXT,
    end_date           TEXT
);

CREATE TABLE IF NOT EXISTS outcomes (
    outcome_id   INTEGER PRIMARY KEY,
    code         TEXT NOT NULL UNIQUE,
    outcome_type TEXT NOT NULL,        -- 'chart' | 'kpi' | ...
    title        TEXT NOT NULL,
    data_json    TEXT NOT NULL DEFAULT '{}',
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS generated_reports (
    report_id   INTEGER PRIMARY KEY,
    period_id   INTEGER NOT NULL REFERENCES reporting_periods(period_id),
    sector_id   INTEGER NOT NULL REFERENCES sectors(sector_id),
    report_name TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS submissions_program_period_idx
    ON submissions(program_id, period_id);
CREATE INDEX IF NOT EXISTS submission_targets_submission_idx
    ON submission_targets(submission_id);
CREATE INDEX IF NOT EXISTS periods_year_type_idx
    ON reporting_periods(year, period_type);
CREATE INDEX IF NOT EXISTS programs_sector_idx ON programs(sector_id);
CREATE INDEX IF NOT EXISTS programs_initiative_idx ON programs(initiative_id);

PRAGMA user_version = 1;
";
