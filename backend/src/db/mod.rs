//! SQLite storage layer.
//!
//! Connections are opened per operation against the configured database
//! file. Multi-row mutations that must stay consistent as a set (apply,
//! withdraw, status changes that bump counters, cascade deletes) run inside
//! a single transaction, so a failure mid-operation rolls back everything
//! including the counter updates.

pub mod map;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Connection;

use crate::error::ApiError;

#[derive(Clone)]
pub struct Db {
    path: PathBuf,
}

impl Db {
    pub fn new(path: PathBuf) -> Db {
        Db { path }
    }

    pub fn open(&self) -> Result<Connection, ApiError> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(conn)
    }

    /// Creates the schema if it does not exist yet. Safe to call on every
    /// startup.
    pub fn init(&self) -> Result<(), ApiError> {
        let conn = self.open()?;
        init_schema(&conn)?;
        Ok(())
    }
}

pub fn init_schema(conn: &Connection) -> Result<(), ApiError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY,
            username      TEXT NOT NULL COLLATE NOCASE UNIQUE,
            email         TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role          TEXT NOT NULL,
            is_active     INTEGER NOT NULL DEFAULT 1,
            last_login    TEXT,
            created_at    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);

        CREATE TABLE IF NOT EXISTS sessions (
            token      TEXT PRIMARY KEY,
            user_id    TEXT NOT NULL REFERENCES users(id),
            expires_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS student_profiles (
            user_id               TEXT PRIMARY KEY REFERENCES users(id),
            first_name            TEXT NOT NULL DEFAULT '',
            last_name             TEXT NOT NULL DEFAULT '',
            phone                 TEXT,
            location              TEXT,
            bio                   TEXT,
            avatar                TEXT,
            resume_url            TEXT,
            resume_filename       TEXT,
            education             TEXT NOT NULL DEFAULT '[]',
            experience            TEXT NOT NULL DEFAULT '[]',
            portfolio             TEXT NOT NULL DEFAULT '[]',
            social_links          TEXT NOT NULL DEFAULT '{}',
            preferences           TEXT NOT NULL DEFAULT
                '{\"job_types\":[],\"locations\":[],\"industries\":[]}',
            applications_count    INTEGER NOT NULL DEFAULT 0,
            shortlisted_count     INTEGER NOT NULL DEFAULT 0,
            selected_count        INTEGER NOT NULL DEFAULT 0,
            skills_assessed_count INTEGER NOT NULL DEFAULT 0,
            created_at            TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS skills (
            id            TEXT PRIMARY KEY,
            user_id       TEXT NOT NULL REFERENCES student_profiles(user_id),
            name          TEXT NOT NULL COLLATE NOCASE,
            proficiency   TEXT NOT NULL DEFAULT 'beginner',
            score         INTEGER NOT NULL DEFAULT 0,
            last_assessed TEXT,
            UNIQUE (user_id, name)
        );

        CREATE TABLE IF NOT EXISTS skill_endorsements (
            skill_id    TEXT NOT NULL REFERENCES skills(id),
            endorser_id TEXT NOT NULL REFERENCES users(id),
            PRIMARY KEY (skill_id, endorser_id)
        );

        CREATE TABLE IF NOT EXISTS recruiter_profiles (
            user_id               TEXT PRIMARY KEY REFERENCES users(id),
            first_name            TEXT NOT NULL DEFAULT '',
            last_name             TEXT NOT NULL DEFAULT '',
            company               TEXT NOT NULL DEFAULT '',
            position              TEXT NOT NULL DEFAULT '',
            phone                 TEXT,
            location              TEXT,
            bio                   TEXT,
            avatar                TEXT,
            company_logo          TEXT,
            company_website       TEXT,
            company_size          TEXT,
            industry              TEXT NOT NULL DEFAULT '',
            social_links          TEXT NOT NULL DEFAULT '{}',
            is_verified           INTEGER NOT NULL DEFAULT 0,
            internships_posted    INTEGER NOT NULL DEFAULT 0,
            applications_received INTEGER NOT NULL DEFAULT 0,
            candidates_hired      INTEGER NOT NULL DEFAULT 0,
            created_at            TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS internships (
            id                   TEXT PRIMARY KEY,
            recruiter_id         TEXT NOT NULL REFERENCES users(id),
            title                TEXT NOT NULL,
            company              TEXT NOT NULL,
            description          TEXT NOT NULL,
            requirements         TEXT NOT NULL DEFAULT '[]',
            responsibilities     TEXT NOT NULL DEFAULT '[]',
            skills               TEXT NOT NULL DEFAULT '[]',
            location             TEXT NOT NULL,
            work_type            TEXT NOT NULL,
            duration             TEXT NOT NULL,
            start_date           TEXT NOT NULL,
            end_date             TEXT,
            stipend              TEXT,
            stipend_min          INTEGER,
            stipend_max          INTEGER,
            stipend_currency     TEXT,
            is_paid              INTEGER NOT NULL DEFAULT 0,
            industry             TEXT NOT NULL,
            application_deadline TEXT NOT NULL,
            openings             INTEGER NOT NULL,
            experience_level     TEXT NOT NULL DEFAULT 'entry-level',
            tags                 TEXT NOT NULL DEFAULT '[]',
            company_logo         TEXT,
            company_website      TEXT,
            is_active            INTEGER NOT NULL DEFAULT 1,
            is_approved          INTEGER NOT NULL DEFAULT 0,
            rejection_reason     TEXT,
            posted_at            TEXT NOT NULL,
            views                INTEGER NOT NULL DEFAULT 0,
            applications_count   INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_internships_recruiter ON internships(recruiter_id);
        CREATE INDEX IF NOT EXISTS idx_internships_visibility
            ON internships(is_active, is_approved, application_deadline);
        CREATE INDEX IF NOT EXISTS idx_internships_posted ON internships(posted_at);

        CREATE TABLE IF NOT EXISTS applications (
            id                 TEXT PRIMARY KEY,
            student_id         TEXT NOT NULL REFERENCES users(id),
            internship_id      TEXT NOT NULL REFERENCES internships(id),
            recruiter_id       TEXT NOT NULL REFERENCES users(id),
            status             TEXT NOT NULL DEFAULT 'applied',
            cover_letter       TEXT,
            resume_url         TEXT,
            resume_filename    TEXT,
            applied_at         TEXT NOT NULL,
            last_updated       TEXT NOT NULL,
            interview_date     TEXT,
            interview_time     TEXT,
            interview_location TEXT,
            interview_type     TEXT,
            interview_notes    TEXT,
            feedback_rating    INTEGER,
            feedback_comments  TEXT,
            feedback_by        TEXT,
            feedback_at        TEXT,
            UNIQUE (student_id, internship_id)
        );
        CREATE INDEX IF NOT EXISTS idx_applications_recruiter ON applications(recruiter_id);
        CREATE INDEX IF NOT EXISTS idx_applications_status ON applications(status);

        CREATE TABLE IF NOT EXISTS application_notes (
            id             TEXT PRIMARY KEY,
            application_id TEXT NOT NULL REFERENCES applications(id),
            author_id      TEXT NOT NULL REFERENCES users(id),
            content        TEXT NOT NULL,
            created_at     TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_notes_application ON application_notes(application_id);

        CREATE TABLE IF NOT EXISTS skill_assessments (
            id                TEXT PRIMARY KEY,
            student_id        TEXT NOT NULL REFERENCES users(id),
            skill             TEXT NOT NULL COLLATE NOCASE,
            questions         TEXT NOT NULL,
            answers           TEXT NOT NULL,
            score             INTEGER NOT NULL,
            total_questions   INTEGER NOT NULL,
            correct_answers   INTEGER NOT NULL,
            time_taken        INTEGER NOT NULL,
            started_at        TEXT NOT NULL,
            completed_at      TEXT NOT NULL,
            proficiency_level TEXT NOT NULL,
            attempt_number    INTEGER NOT NULL DEFAULT 1
        );
        CREATE INDEX IF NOT EXISTS idx_assessments_student
            ON skill_assessments(student_id, skill, completed_at);",
    )?;
    Ok(())
}

/// Timestamps are stored as RFC 3339 text.
pub fn ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub fn parse_ts(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

pub fn parse_opt_ts(s: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    s.as_deref().map(parse_ts).transpose()
}

/// SQL LIMIT/OFFSET pair for a 1-based page.
pub fn limit_offset(page: u32, limit: u32) -> (i64, i64) {
    let limit = i64::from(limit);
    let offset = (i64::from(page) - 1) * limit;
    (limit, offset)
}

/// Decodes a JSON text column.
pub fn from_json<T: serde::de::DeserializeOwned>(s: &str) -> rusqlite::Result<T> {
    serde_json::from_str(s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

/// Encodes a value for a JSON text column.
pub fn to_json<T: serde::Serialize>(v: &T) -> Result<String, ApiError> {
    serde_json::to_string(v).map_err(|e| ApiError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_initializes_on_a_fresh_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Db::new(dir.path().join("test.sqlite"));
        db.init().expect("init");
        // idempotent
        db.init().expect("re-init");

        let conn = db.open().expect("open");
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .expect("query");
        assert_eq!(n, 0);
    }

    #[test]
    fn limit_offset_is_one_based() {
        assert_eq!(limit_offset(1, 10), (10, 0));
        assert_eq!(limit_offset(3, 20), (20, 40));
    }
}
