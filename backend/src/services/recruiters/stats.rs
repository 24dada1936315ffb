use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::profile::RecruiterStats;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::{ts, Db};
use crate::error::ApiError;

#[derive(Serialize)]
struct RecruiterStatsSummary {
    stats: RecruiterStats,
    active_internships: i64,
    open_internships: i64,
    total_views: i64,
    applicants_by_status: BTreeMap<String, i64>,
}

/// The profile's counters plus live aggregates over the caller's postings.
pub(crate) async fn process(db: web::Data<Db>, user: AuthUser) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManagePostings)?;
    let conn = db.open()?;
    Ok(HttpResponse::Ok().json(recruiter_stats(&conn, &user.id)?))
}

fn recruiter_stats(conn: &Connection, recruiter_id: &str) -> Result<RecruiterStatsSummary, ApiError> {
    let stats = conn
        .query_row(
            "SELECT internships_posted, applications_received, candidates_hired
             FROM recruiter_profiles WHERE user_id = ?1",
            params![recruiter_id],
            |row| {
                Ok(RecruiterStats {
                    internships_posted: row.get(0)?,
                    applications_received: row.get(1)?,
                    candidates_hired: row.get(2)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Recruiter profile not found".to_string()))?;

    let (active_internships, total_views): (i64, i64) = conn.query_row(
        "SELECT COUNT(CASE WHEN is_active = 1 THEN 1 END), COALESCE(SUM(views), 0)
         FROM internships WHERE recruiter_id = ?1",
        params![recruiter_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let open_internships: i64 = conn.query_row(
        "SELECT COUNT(*) FROM internships
         WHERE recruiter_id = ?1 AND is_active = 1 AND is_approved = 1
           AND application_deadline > ?2",
        params![recruiter_id, ts(Utc::now())],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM applications WHERE recruiter_id = ?1 GROUP BY status",
    )?;
    let applicants_by_status = stmt
        .query_map(params![recruiter_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

    Ok(RecruiterStatsSummary {
        stats,
        active_internships,
        open_internships,
        total_views,
        applicants_by_status,
    })
}
