use actix_web::{web, HttpResponse};
use rusqlite::types::Value;
use serde::Deserialize;

use crate::db::Db;
use crate::error::ApiError;

use super::{run_paged, visible_clause};

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    q: Option<String>,
    stipend_min: Option<i64>,
    stipend_max: Option<i64>,
    duration: Option<String>,
    remote: Option<bool>,
    experience_level: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

/// Free-text search over title, company, description and the skills column,
/// narrowed by stipend range, duration, remote flag and experience level.
pub(crate) async fn process(
    db: web::Data<Db>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = db.open()?;
    let (page, limit) = common::pagination::clamp(query.page, query.limit);

    let mut params: Vec<Value> = Vec::new();
    let mut where_sql = visible_clause(&mut params).to_string();

    if let Some(term) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        where_sql.push_str(
            " AND (title LIKE ? OR company LIKE ? OR description LIKE ? OR skills LIKE ?)",
        );
        let like = format!("%{}%", term);
        for _ in 0..4 {
            params.push(Value::Text(like.clone()));
        }
    }
    if let Some(min) = query.stipend_min {
        where_sql.push_str(" AND stipend_max >= ?");
        params.push(Value::Integer(min));
    }
    if let Some(max) = query.stipend_max {
        where_sql.push_str(" AND stipend_min <= ?");
        params.push(Value::Integer(max));
    }
    if let Some(duration) = query.duration.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND duration LIKE ?");
        params.push(Value::Text(format!("%{}%", duration)));
    }
    if let Some(remote) = query.remote {
        if remote {
            where_sql.push_str(" AND work_type = 'remote'");
        } else {
            where_sql.push_str(" AND work_type != 'remote'");
        }
    }
    if let Some(level) = query
        .experience_level
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        where_sql.push_str(" AND experience_level = ?");
        params.push(Value::Text(level.to_string()));
    }

    let page_result = run_paged(&conn, &where_sql, &params, "posted_at DESC", page, limit)?;
    Ok(HttpResponse::Ok().json(page_result))
}
