use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::internship::Internship;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};

use crate::db::map::{internship_from_row, INTERNSHIP_COLS};
use crate::db::{from_json, ts, Db};
use crate::error::ApiError;

pub(crate) async fn process(
    db: web::Data<Db>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let conn = db.open()?;
    Ok(HttpResponse::Ok().json(similar(&conn, &path)?))
}

/// Up to four visible postings sharing the industry, the location or at
/// least one skill with the given one, newest first.
pub(crate) fn similar(conn: &Connection, id: &str) -> Result<Vec<Internship>, ApiError> {
    let now = ts(Utc::now());

    let base = conn
        .query_row(
            "SELECT industry, location, skills FROM internships
             WHERE id = ?1 AND is_active = 1 AND is_approved = 1 AND application_deadline > ?2",
            [id, now.as_str()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Internship not found".to_string()))?;

    let (industry, location, skills_json) = base;
    let skills: Vec<String> = from_json(&skills_json)?;

    let mut overlap = String::from("industry = ? OR location = ?");
    let mut params: Vec<Value> = vec![
        Value::Text(id.to_string()),
        Value::Text(now),
        Value::Text(industry),
        Value::Text(location),
    ];
    for skill in skills.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        overlap.push_str(" OR skills LIKE ?");
        params.push(Value::Text(format!("%\"{}%", skill)));
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM internships
         WHERE id != ? AND is_active = 1 AND is_approved = 1 AND application_deadline > ?
           AND ({})
         ORDER BY posted_at DESC LIMIT 4",
        INTERNSHIP_COLS, overlap
    ))?;
    let similar = stmt
        .query_map(params_from_iter(params.iter()), internship_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(similar)
}
