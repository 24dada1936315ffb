//! # Public Internship Catalog Module
//!
//! Read-only browsing endpoints under `/api/internships`. Everything here
//! applies the same visibility rule: a posting is shown only while it is
//! active, approved and its application deadline is in the future.
//!
//! ## Sub-modules:
//! - `list`: filtered, sorted, paginated listing.
//! - `search`: free-text search across title, company, description and skills.
//! - `featured`: most-viewed visible postings.
//! - `stats`: aggregate counts plus top industries and locations.
//! - `detail`: single posting, bumps the view counter.
//! - `similar`: visible peers sharing industry, location or a skill.

mod detail;
mod featured;
mod list;
mod search;
mod similar;
mod stats;

use actix_web::web::{get, scope};
use actix_web::Scope;

use chrono::Utc;
use common::model::internship::Internship;
use common::pagination::Paginated;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use crate::db::map::{internship_from_row, INTERNSHIP_COLS};
use crate::db::{limit_offset, ts};
use crate::error::ApiError;

const API_PATH: &str = "/api/internships";

pub fn configure_routes() -> Scope {
    // literal paths before the `{id}` capture
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("/search", get().to(search::process))
        .route("/featured", get().to(featured::process))
        .route("/stats", get().to(stats::process))
        .route("/{id}", get().to(detail::process))
        .route("/{id}/similar", get().to(similar::process))
}

/// WHERE fragment for publicly visible postings; pushes the deadline cutoff
/// onto `params`.
pub(crate) fn visible_clause(params: &mut Vec<Value>) -> &'static str {
    params.push(Value::Text(ts(Utc::now())));
    "is_active = 1 AND is_approved = 1 AND application_deadline > ?"
}

/// Runs a COUNT plus a LIMIT/OFFSET page over the internships table for the
/// given WHERE fragment.
pub(crate) fn run_paged(
    conn: &Connection,
    where_sql: &str,
    params: &[Value],
    order_sql: &str,
    page: u32,
    limit: u32,
) -> Result<Paginated<Internship>, ApiError> {
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM internships WHERE {}", where_sql),
        params_from_iter(params.iter()),
        |row| row.get(0),
    )?;

    let (lim, offset) = limit_offset(page, limit);
    let mut page_params = params.to_vec();
    page_params.push(Value::Integer(lim));
    page_params.push(Value::Integer(offset));

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM internships WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
        INTERNSHIP_COLS, where_sql, order_sql
    ))?;
    let items = stmt
        .query_map(params_from_iter(page_params.iter()), internship_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Paginated::new(items, page, limit, total))
}
