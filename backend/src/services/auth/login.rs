use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::requests::{AuthResponse, LoginRequest};
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::{issue_session, verify_password};
use crate::config::AppConfig;
use crate::db::{ts, Db};
use crate::error::ApiError;
use crate::validation::normalize_email;

use super::fetch_user;

pub(crate) async fn process(
    db: web::Data<Db>,
    config: web::Data<AppConfig>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let conn = db.open()?;
    let response = login(&conn, &payload, config.session_ttl_hours)?;
    Ok(HttpResponse::Ok().json(response))
}

pub(crate) fn login(
    conn: &Connection,
    req: &LoginRequest,
    ttl_hours: i64,
) -> Result<AuthResponse, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Please provide email and password".to_string(),
        ));
    }
    let email = normalize_email(&req.email);

    let row = conn
        .query_row(
            "SELECT id, password_hash, is_active FROM users WHERE email = ?1",
            params![email],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                ))
            },
        )
        .optional()?;

    // same error for unknown email and wrong password
    let (user_id, password_hash, is_active) = row.ok_or_else(|| {
        ApiError::Authentication("Invalid email or password".to_string())
    })?;
    if !verify_password(&req.password, &password_hash) {
        return Err(ApiError::Authentication(
            "Invalid email or password".to_string(),
        ));
    }
    if !is_active {
        return Err(ApiError::Authentication(
            "Your account has been deactivated".to_string(),
        ));
    }

    let now = Utc::now();
    conn.execute(
        "UPDATE users SET last_login = ?1 WHERE id = ?2",
        params![ts(now), user_id],
    )?;
    let token = issue_session(conn, &user_id, ttl_hours)?;
    let user = fetch_user(conn, &user_id)?;

    Ok(AuthResponse { token, user })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::services::auth::register::register;
    use common::model::user::Role;
    use common::requests::RegisterRequest;

    fn conn_with_account(active: bool) -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn).expect("schema");
        register(
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
        if !active {
            conn.execute("UPDATE users SET is_active = 0", [])
                .expect("deactivate");
        }
        conn
    }

    fn attempt(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn login_stamps_last_login_and_issues_token() {
        let conn = conn_with_account(true);
        let resp = login(&conn, &attempt("alice@x.com", "Passw0rd"), 24).expect("login");
        assert_eq!(resp.user.role, Role::Student);
        assert!(resp.user.last_login.is_some());
        assert!(crate::auth::resolve_session(&conn, &resp.token).is_ok());
    }

    #[test]
    fn wrong_password_and_unknown_email_get_the_same_error() {
        let conn = conn_with_account(true);
        let e1 = login(&conn, &attempt("alice@x.com", "Nope1234"), 24).unwrap_err();
        let e2 = login(&conn, &attempt("ghost@x.com", "Passw0rd"), 24).unwrap_err();
        assert_eq!(e1.to_string(), e2.to_string());
    }

    #[test]
    fn deactivated_account_cannot_log_in() {
        let conn = conn_with_account(false);
        let err = login(&conn, &attempt("alice@x.com", "Passw0rd"), 24).unwrap_err();
        assert!(matches!(err, ApiError::Authentication(_)));
    }
}
