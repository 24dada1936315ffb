//! Posting moderation: postings go live on creation, and this is where an
//! admin pulls one back or reinstates it.

use actix_web::{web, HttpResponse};
use common::model::internship::Internship;
use common::pagination::Paginated;
use common::requests::RejectInternshipRequest;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Deserialize;

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{internship_from_row, INTERNSHIP_COLS};
use crate::db::{limit_offset, Db};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    /// `pending` or `approved`.
    status: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

pub(crate) async fn list_process(
    db: web::Data<Db>,
    user: AuthUser,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::Moderate)?;
    let conn = db.open()?;
    let (page, limit) = common::pagination::clamp(query.page, query.limit);

    let where_sql = match query.status.as_deref() {
        Some("pending") => "is_approved = 0",
        Some("approved") => "is_approved = 1",
        _ => "1 = 1",
    };
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM internships WHERE {}", where_sql),
        [],
        |row| row.get(0),
    )?;

    let (lim, offset) = limit_offset(page, limit);
    let page_params: Vec<Value> = vec![Value::Integer(lim), Value::Integer(offset)];
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM internships WHERE {} ORDER BY posted_at DESC LIMIT ? OFFSET ?",
        INTERNSHIP_COLS, where_sql
    ))?;
    let items = stmt
        .query_map(params_from_iter(page_params.iter()), internship_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(Paginated::new(items, page, limit, total)))
}

pub(crate) async fn approve_process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::Moderate)?;
    let conn = db.open()?;
    Ok(HttpResponse::Ok().json(approve(&conn, &path)?))
}

pub(crate) async fn reject_process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
    payload: web::Json<RejectInternshipRequest>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::Moderate)?;
    let conn = db.open()?;
    Ok(HttpResponse::Ok().json(reject(&conn, &path, &payload.reason)?))
}

/// Approval clears any earlier rejection and reactivates the posting.
pub(crate) fn approve(conn: &Connection, id: &str) -> Result<Internship, ApiError> {
    let updated = conn.execute(
        "UPDATE internships SET is_approved = 1, is_active = 1, rejection_reason = NULL
         WHERE id = ?1",
        params![id],
    )?;
    if updated == 0 {
        return Err(ApiError::NotFound("Internship not found".to_string()));
    }
    fetch(conn, id)
}

/// Rejection records the reason and takes the posting out of circulation.
pub(crate) fn reject(conn: &Connection, id: &str, reason: &str) -> Result<Internship, ApiError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ApiError::BadRequest(
            "A rejection reason is required".to_string(),
        ));
    }
    let updated = conn.execute(
        "UPDATE internships SET is_approved = 0, is_active = 0, rejection_reason = ?1
         WHERE id = ?2",
        params![reason, id],
    )?;
    if updated == 0 {
        return Err(ApiError::NotFound("Internship not found".to_string()));
    }
    fetch(conn, id)
}

fn fetch(conn: &Connection, id: &str) -> Result<Internship, ApiError> {
    conn.query_row(
        &format!("SELECT {} FROM internships WHERE id = ?1", INTERNSHIP_COLS),
        params![id],
        internship_from_row,
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound("Internship not found".to_string()))
}
