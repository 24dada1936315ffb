use actix_web::{web, HttpResponse};
use common::pagination::Paginated;
use rusqlite::types::Value;
use rusqlite::params_from_iter;
use serde::Deserialize;

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{user_from_row, USER_COLS};
use crate::db::{limit_offset, Db};
use crate::error::ApiError;
use crate::services::recruiters::profile::fetch_profile;

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    verified: Option<bool>,
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

    let mut where_sql =
        "u.role = 'recruiter' AND p.user_id = u.id".to_string();
    let mut filters: Vec<Value> = Vec::new();
    if let Some(verified) = query.verified {
        where_sql.push_str(" AND p.is_verified = ?");
        filters.push(Value::Integer(i64::from(verified)));
    }

    let total: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM users u, recruiter_profiles p WHERE {}",
            where_sql
        ),
        params_from_iter(filters.iter()),
        |row| row.get(0),
    )?;

    let cols: String = USER_COLS
        .split(", ")
        .map(|c| format!("u.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ");
    let (lim, offset) = limit_offset(page, limit);
    filters.push(Value::Integer(lim));
    filters.push(Value::Integer(offset));
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users u, recruiter_profiles p WHERE {}
         ORDER BY u.created_at DESC LIMIT ? OFFSET ?",
        cols, where_sql
    ))?;
    let items = stmt
        .query_map(params_from_iter(filters.iter()), user_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(Paginated::new(items, page, limit, total)))
}

/// Marks a recruiter profile verified.
pub(crate) async fn verify_process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::Moderate)?;
    let conn = db.open()?;
    let id = path.into_inner();

    let updated = conn.execute(
        "UPDATE recruiter_profiles SET is_verified = 1 WHERE user_id = ?1",
        rusqlite::params![id],
    )?;
    if updated == 0 {
        return Err(ApiError::NotFound("Recruiter profile not found".to_string()));
    }
    Ok(HttpResponse::Ok().json(fetch_profile(&conn, &id)?))
}
