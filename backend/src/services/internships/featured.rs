use actix_web::{web, HttpResponse};
use rusqlite::types::Value;
use serde::Deserialize;

use crate::db::Db;
use crate::error::ApiError;

use super::{run_paged, visible_clause};

#[derive(Debug, Deserialize)]
pub(crate) struct FeaturedQuery {
    limit: Option<u32>,
}

/// The most-viewed visible postings, newest first among ties.
pub(crate) async fn process(
    db: web::Data<Db>,
    query: web::Query<FeaturedQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = db.open()?;
    let limit = query.limit.unwrap_or(6).clamp(1, 20);

    let mut params: Vec<Value> = Vec::new();
    let where_sql = visible_clause(&mut params);
    let page_result = run_paged(&conn, where_sql, &params, "views DESC, posted_at DESC", 1, limit)?;
    Ok(HttpResponse::Ok().json(page_result.items))
}
