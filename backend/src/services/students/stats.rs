use actix_web::{web, HttpResponse};
use common::model::profile::StudentStats;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::Db;
use crate::error::ApiError;

#[derive(Serialize)]
struct StudentStatsSummary {
    stats: StudentStats,
    skills_count: i64,
    assessments_count: i64,
    applications_by_status: BTreeMap<String, i64>,
}

/// The profile's denormalized counters plus live counts over the student's
/// skills, attempts and applications.
pub(crate) async fn process(db: web::Data<Db>, user: AuthUser) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManageStudentProfile)?;
    let conn = db.open()?;
    Ok(HttpResponse::Ok().json(student_stats(&conn, &user.id)?))
}

fn student_stats(conn: &Connection, student_id: &str) -> Result<StudentStatsSummary, ApiError> {
    let stats = conn
        .query_row(
            "SELECT applications_count, shortlisted_count, selected_count, skills_assessed_count
             FROM student_profiles WHERE user_id = ?1",
            params![student_id],
            |row| {
                Ok(StudentStats {
                    applications_count: row.get(0)?,
                    shortlisted_count: row.get(1)?,
                    selected_count: row.get(2)?,
                    skills_assessed_count: row.get(3)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Student profile not found".to_string()))?;

    let skills_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM skills WHERE user_id = ?1",
        params![student_id],
        |row| row.get(0),
    )?;
    let assessments_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM skill_assessments WHERE student_id = ?1",
        params![student_id],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM applications WHERE student_id = ?1 GROUP BY status",
    )?;
    let applications_by_status = stmt
        .query_map(params![student_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

    Ok(StudentStatsSummary {
        stats,
        skills_count,
        assessments_count,
        applications_by_status,
    })
}
