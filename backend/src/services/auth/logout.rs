use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::{revoke_session, AuthUser};
use crate::db::Db;
use crate::error::ApiError;

/// Revokes the calling session, so the presented token stops working
/// immediately rather than lingering until expiry.
pub(crate) async fn process(db: web::Data<Db>, user: AuthUser) -> Result<HttpResponse, ApiError> {
    let conn = db.open()?;
    revoke_session(&conn, &user.token)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Logged out successfully" })))
}
