use actix_web::{web, HttpResponse};
use rusqlite::types::Value;
use serde::Deserialize;

use crate::db::Db;
use crate::error::ApiError;

use super::{run_paged, visible_clause};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<String>,
    location: Option<String>,
    industry: Option<String>,
    work_type: Option<String>,
    experience_level: Option<String>,
    is_paid: Option<bool>,
    /// Comma-separated skill names, matched against the skills column.
    skills: Option<String>,
    sort: Option<String>,
    order: Option<String>,
}

pub(crate) async fn process(
    db: web::Data<Db>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = db.open()?;
    let (page, limit) = common::pagination::clamp(query.page, query.limit);

    let mut params: Vec<Value> = Vec::new();
    let mut where_sql = visible_clause(&mut params).to_string();

    if let Some(search) = trimmed(&query.search) {
        let like = format!("%{}%", search);
        where_sql.push_str(" AND (title LIKE ? OR company LIKE ? OR description LIKE ?)");
        for _ in 0..3 {
            params.push(Value::Text(like.clone()));
        }
    }
    if let Some(location) = trimmed(&query.location) {
        where_sql.push_str(" AND location LIKE ?");
        params.push(Value::Text(format!("%{}%", location)));
    }
    if let Some(industry) = trimmed(&query.industry) {
        where_sql.push_str(" AND industry = ?");
        params.push(Value::Text(industry.to_string()));
    }
    if let Some(work_type) = trimmed(&query.work_type) {
        where_sql.push_str(" AND work_type = ?");
        params.push(Value::Text(work_type.to_string()));
    }
    if let Some(level) = trimmed(&query.experience_level) {
        where_sql.push_str(" AND experience_level = ?");
        params.push(Value::Text(level.to_string()));
    }
    if let Some(is_paid) = query.is_paid {
        where_sql.push_str(" AND is_paid = ?");
        params.push(Value::Integer(i64::from(is_paid)));
    }
    if let Some(skills) = trimmed(&query.skills) {
        for skill in skills.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            where_sql.push_str(" AND skills LIKE ?");
            params.push(Value::Text(format!("%\"{}%", skill)));
        }
    }

    let page_result = run_paged(
        &conn,
        &where_sql,
        &params,
        &order_by(query.sort.as_deref(), query.order.as_deref()),
        page,
        limit,
    )?;
    Ok(HttpResponse::Ok().json(page_result))
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Sort column is whitelisted; anything unknown falls back to newest first.
fn order_by(sort: Option<&str>, order: Option<&str>) -> String {
    let column = match sort {
        Some("application_deadline") => "application_deadline",
        Some("views") => "views",
        Some("title") => "title",
        _ => "posted_at",
    };
    let direction = match order {
        Some("asc") => "ASC",
        _ => "DESC",
    };
    format!("{} {}", column, direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_columns_fall_back_to_posted_at() {
        assert_eq!(order_by(Some("views"), Some("asc")), "views ASC");
        assert_eq!(order_by(Some("password_hash"), None), "posted_at DESC");
        assert_eq!(order_by(None, Some("junk")), "posted_at DESC");
    }
}
