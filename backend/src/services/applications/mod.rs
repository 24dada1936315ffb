//! # Application Lifecycle Module
//!
//! Endpoints under `/api/applications` for the application record itself:
//! submitting one, listing and withdrawing one's own, reading a single
//! application, appending recruiter notes and the role-scoped stats summary.
//! Status moves driven by recruiters live in the recruiter module.
//!
//! ## Sub-modules:
//! - `apply`: student submission with the three counter bumps in one transaction.
//! - `my_applications`: the student's own applications, filter + pagination.
//! - `detail`: one application, visible to its student, its recruiter or an admin.
//! - `withdraw`: student-driven terminal move, decrements the internship counter.
//! - `notes`: append-only recruiter notes.
//! - `stats`: totals, status breakdown and monthly buckets scoped to the caller.

pub(crate) mod apply;
pub(crate) mod notes;

mod detail;
mod my_applications;
mod stats;
mod withdraw;

#[cfg(test)]
pub(crate) mod test_support;

use actix_web::web::{get, post, put, scope};
use actix_web::Scope;

use common::model::application::{Application, Note};
use rusqlite::{params, Connection};

use crate::db::parse_ts;
use crate::error::ApiError;

const API_PATH: &str = "/api/applications";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(apply::process))
        .route("/my-applications", get().to(my_applications::process))
        .route("/stats", get().to(stats::process))
        .route("/{id}", get().to(detail::process))
        .route("/{id}/withdraw", put().to(withdraw::process))
        .route("/{id}/notes", post().to(notes::process))
}

/// Attaches the note thread, oldest first, with author usernames resolved.
pub(crate) fn attach_notes(conn: &Connection, app: &mut Application) -> Result<(), ApiError> {
    let mut stmt = conn.prepare(
        "SELECT n.author_id, u.username, n.content, n.created_at
         FROM application_notes n LEFT JOIN users u ON u.id = n.author_id
         WHERE n.application_id = ?1 ORDER BY n.created_at",
    )?;
    app.notes = stmt
        .query_map(params![app.id], |row| {
            let created_at: String = row.get(3)?;
            Ok(Note {
                author_id: row.get(0)?,
                author_username: row.get(1)?,
                content: row.get(2)?,
                created_at: parse_ts(&created_at)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(())
}
