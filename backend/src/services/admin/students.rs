use actix_web::{web, HttpResponse};
use common::model::profile::StudentProfile;
use common::model::user::User;
use common::pagination::Paginated;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};
use serde::{Deserialize, Serialize};

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{user_from_row, USER_COLS};
use crate::db::{limit_offset, Db};
use crate::error::ApiError;
use crate::services::students::profile::fetch_profile;

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    search: Option<String>,
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

    let mut where_sql = "role = 'student'".to_string();
    let mut filters: Vec<Value> = Vec::new();
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND (username LIKE ? OR email LIKE ?)");
        let like = format!("%{}%", search);
        filters.push(Value::Text(like.clone()));
        filters.push(Value::Text(like));
    }

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM users WHERE {}", where_sql),
        params_from_iter(filters.iter()),
        |row| row.get(0),
    )?;

    let (lim, offset) = limit_offset(page, limit);
    filters.push(Value::Integer(lim));
    filters.push(Value::Integer(offset));
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users WHERE {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        USER_COLS, where_sql
    ))?;
    let items = stmt
        .query_map(params_from_iter(filters.iter()), user_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(Paginated::new(items, page, limit, total)))
}

#[derive(Serialize)]
struct StudentDetail {
    user: User,
    profile: StudentProfile,
    assessments_count: i64,
}

pub(crate) async fn detail_process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::Moderate)?;
    let conn = db.open()?;
    let id = path.into_inner();

    let subject = crate::services::auth::fetch_user(&conn, &id)?;
    let profile = fetch_profile(&conn, &id)?;
    let assessments_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM skill_assessments WHERE student_id = ?1",
        params![id],
        |row| row.get(0),
    )?;

    Ok(HttpResponse::Ok().json(StudentDetail {
        user: subject,
        profile,
        assessments_count,
    }))
}
