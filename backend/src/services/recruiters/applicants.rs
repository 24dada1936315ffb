use actix_web::{web, HttpResponse};
use common::model::application::{Application, ApplicationStatus};
use common::pagination::Paginated;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{application_from_row, APPLICATION_COLS};
use crate::db::{limit_offset, Db};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub(crate) struct ApplicantsQuery {
    status: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Serialize)]
struct Applicant {
    #[serde(flatten)]
    application: Application,
    student_username: String,
    student_name: String,
    internship_title: String,
}

/// Applicants to one of the caller's postings. A posting owned by someone
/// else reads as absent.
pub(crate) async fn per_internship_process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
    query: web::Query<ApplicantsQuery>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::TriageApplicants)?;
    let conn = db.open()?;
    let internship_id = path.into_inner();

    let owned: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM internships WHERE id = ?1 AND recruiter_id = ?2",
            params![internship_id, user.id],
            |row| row.get(0),
        )
        .optional()?;
    if owned.is_none() {
        return Err(ApiError::NotFound("Internship not found".to_string()));
    }

    let page_result = applicants(
        &conn,
        "a.internship_id = ?",
        &internship_id,
        &query,
    )?;
    Ok(HttpResponse::Ok().json(page_result))
}

/// Applicants across every posting owned by the caller.
pub(crate) async fn across_all_process(
    db: web::Data<Db>,
    user: AuthUser,
    query: web::Query<ApplicantsQuery>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::TriageApplicants)?;
    let conn = db.open()?;
    let page_result = applicants(&conn, "a.recruiter_id = ?", &user.id, &query)?;
    Ok(HttpResponse::Ok().json(page_result))
}

fn applicants(
    conn: &Connection,
    scope_sql: &str,
    scope_id: &str,
    query: &ApplicantsQuery,
) -> Result<Paginated<Applicant>, ApiError> {
    let (page, limit) = common::pagination::clamp(query.page, query.limit);

    let mut where_sql = scope_sql.to_string();
    let mut filters: Vec<Value> = vec![Value::Text(scope_id.to_string())];
    if let Some(status) = query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let status = ApplicationStatus::parse(status)
            .ok_or_else(|| ApiError::BadRequest("Unknown application status".to_string()))?;
        where_sql.push_str(" AND a.status = ?");
        filters.push(Value::Text(status.as_str().to_string()));
    }

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM applications a WHERE {}", where_sql),
        params_from_iter(filters.iter()),
        |row| row.get(0),
    )?;

    let (lim, offset) = limit_offset(page, limit);
    filters.push(Value::Integer(lim));
    filters.push(Value::Integer(offset));

    let cols: String = APPLICATION_COLS
        .split(", ")
        .map(|c| format!("a.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT {cols}, u.username, sp.first_name, sp.last_name, i.title
         FROM applications a
         JOIN users u ON u.id = a.student_id
         LEFT JOIN student_profiles sp ON sp.user_id = a.student_id
         JOIN internships i ON i.id = a.internship_id
         WHERE {where_sql} ORDER BY a.applied_at DESC LIMIT ? OFFSET ?",
        cols = cols,
        where_sql = where_sql
    ))?;
    let items = stmt
        .query_map(params_from_iter(filters.iter()), |row| {
            let application = application_from_row(row)?;
            let username: String = row.get("username")?;
            let first_name: Option<String> = row.get("first_name")?;
            let last_name: Option<String> = row.get("last_name")?;
            let title: String = row.get("title")?;
            let student_name = format!(
                "{} {}",
                first_name.unwrap_or_default(),
                last_name.unwrap_or_default()
            )
            .trim()
            .to_string();
            Ok(Applicant {
                application,
                student_username: username,
                student_name,
                internship_title: title,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Paginated::new(items, page, limit, total))
}
