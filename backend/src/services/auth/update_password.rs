use actix_web::{web, HttpResponse};
use common::requests::{AuthResponse, UpdatePasswordRequest};
use rusqlite::{params, Connection};

use crate::auth::{hash_password, issue_session, verify_password, AuthUser};
use crate::config::AppConfig;
use crate::db::Db;
use crate::error::ApiError;
use crate::validation::validate_new_password;

use super::fetch_user;

pub(crate) async fn process(
    db: web::Data<Db>,
    config: web::Data<AppConfig>,
    user: AuthUser,
    payload: web::Json<UpdatePasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    let conn = db.open()?;
    let response = update_password(&conn, &user, &payload, config.session_ttl_hours)?;
    Ok(HttpResponse::Ok().json(response))
}

pub(crate) fn update_password(
    conn: &Connection,
    user: &AuthUser,
    req: &UpdatePasswordRequest,
    ttl_hours: i64,
) -> Result<AuthResponse, ApiError> {
    let current_hash: String = conn.query_row(
        "SELECT password_hash FROM users WHERE id = ?1",
        params![user.id],
        |row| row.get(0),
    )?;
    if !verify_password(&req.current_password, &current_hash) {
        return Err(ApiError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }
    validate_new_password(&req.new_password)?;

    let new_hash = hash_password(&req.new_password)?;
    conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE id = ?2",
        params![new_hash, user.id],
    )?;

    let token = issue_session(conn, &user.id, ttl_hours)?;
    Ok(AuthResponse {
        token,
        user: fetch_user(conn, &user.id)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::services::auth::login::login;
    use crate::services::auth::register::register;
    use common::requests::{LoginRequest, RegisterRequest};

    #[test]
    fn rotation_requires_the_current_password() {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn).expect("schema");
        let auth = register(
            &conn,
            &RegisterRequest {
                username: "alice".to_string(),
                email: "alice@x.com".to_string(),
                password: "Passw0rd".to_string(),
                role: None,
                first_name: None,
                last_name: None,
            },
            24,
        )
        .expect("register");
        let user = crate::auth::resolve_session(&conn, &auth.token).expect("resolve");

        let err = update_password(
            &conn,
            &user,
            &UpdatePasswordRequest {
                current_password: "Wrong000".to_string(),
                new_password: "NextPw1x".to_string(),
            },
            24,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        update_password(
            &conn,
            &user,
            &UpdatePasswordRequest {
                current_password: "Passw0rd".to_string(),
                new_password: "NextPw1x".to_string(),
            },
            24,
        )
        .expect("update");

        // old password no longer works, new one does
        assert!(login(
            &conn,
            &LoginRequest {
                email: "alice@x.com".to_string(),
                password: "Passw0rd".to_string(),
            },
            24,
        )
        .is_err());
        assert!(login(
            &conn,
            &LoginRequest {
                email: "alice@x.com".to_string(),
                password: "NextPw1x".to_string(),
            },
            24,
        )
        .is_ok());
    }
}
