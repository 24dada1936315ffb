use actix_web::{web, HttpResponse};
use common::model::user::Role;
use rusqlite::{params, OptionalExtension};

use crate::auth::AuthUser;
use crate::db::map::{application_from_row, APPLICATION_COLS};
use crate::db::Db;
use crate::error::ApiError;

use super::attach_notes;

/// One application with its note thread. Visible to the owning student, the
/// owning recruiter and admins; anyone else gets a 403.
pub(crate) async fn process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let conn = db.open()?;

    let mut application = conn
        .query_row(
            &format!("SELECT {} FROM applications WHERE id = ?1", APPLICATION_COLS),
            params![id],
            application_from_row,
        )
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;

    let allowed = user.role == Role::Admin
        || application.student_id == user.id
        || application.recruiter_id == user.id;
    if !allowed {
        return Err(ApiError::Forbidden(
            "Not authorized to view this application".to_string(),
        ));
    }

    attach_notes(&conn, &mut application)?;
    Ok(HttpResponse::Ok().json(application))
}
