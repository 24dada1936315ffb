use actix_web::{web, HttpResponse};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::db::map::{internship_from_row, INTERNSHIP_COLS};
use crate::db::{ts, Db};
use crate::error::ApiError;

/// Single visible posting. Each fetch counts as one view.
pub(crate) async fn process(
    db: web::Data<Db>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let conn = db.open()?;

    let updated = conn.execute(
        "UPDATE internships SET views = views + 1
         WHERE id = ?1 AND is_active = 1 AND is_approved = 1 AND application_deadline > ?2",
        params![id, ts(Utc::now())],
    )?;
    if updated == 0 {
        return Err(ApiError::NotFound("Internship not found".to_string()));
    }

    let internship = conn
        .query_row(
            &format!("SELECT {} FROM internships WHERE id = ?1", INTERNSHIP_COLS),
            params![id],
            internship_from_row,
        )
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Internship not found".to_string()))?;

    Ok(HttpResponse::Ok().json(internship))
}
