//! Registration: creates the user and its role-matching empty profile in one
//! transaction and returns a session token.
//!
//! The `admin` role is not creatable here; admin accounts come from the
//! operator seed (see `config::AdminSeed`).

use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::user::{Role, User};
use common::requests::{AuthResponse, RegisterRequest};
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::{hash_password, issue_session};
use crate::config::AppConfig;
use crate::db::{ts, Db};
use crate::error::ApiError;
use crate::validation::{normalize_email, validate_registration};

pub(crate) async fn process(
    db: web::Data<Db>,
    config: web::Data<AppConfig>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let conn = db.open()?;
    let response = register(&conn, &payload, config.session_ttl_hours)?;
    Ok(HttpResponse::Created().json(response))
}

pub(crate) fn register(
    conn: &Connection,
    req: &RegisterRequest,
    ttl_hours: i64,
) -> Result<AuthResponse, ApiError> {
    validate_registration(req)?;

    let role = req.role.unwrap_or(Role::Student);
    if role == Role::Admin {
        return Err(ApiError::Forbidden(
            "Admin accounts cannot be created through registration".to_string(),
        ));
    }

    let username = req.username.trim().to_string();
    let email = normalize_email(&req.email);
    let now = Utc::now();

    let tx = conn.unchecked_transaction()?;

    let duplicate: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM users WHERE email = ?1 OR username = ?2",
            params![email, username],
            |row| row.get(0),
        )
        .optional()?;
    if duplicate.is_some() {
        return Err(ApiError::Conflict(
            "User with this email or username already exists".to_string(),
        ));
    }

    let user_id = uuid::Uuid::new_v4().to_string();
    let password_hash = hash_password(&req.password)?;
    // a racing registration can slip past the check above and trip the
    // UNIQUE constraints instead
    tx.execute(
        "INSERT INTO users (id, username, email, password_hash, role, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
        params![user_id, username, email, password_hash, role.as_str(), ts(now)],
    )
    .map_err(unique_conflict)?;

    let first_name = req.first_name.clone().unwrap_or_default();
    let last_name = req.last_name.clone().unwrap_or_default();
    match role {
        Role::Student => {
            tx.execute(
                "INSERT INTO student_profiles (user_id, first_name, last_name, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, first_name, last_name, ts(now)],
            )?;
        }
        Role::Recruiter => {
            tx.execute(
                "INSERT INTO recruiter_profiles (user_id, first_name, last_name, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, first_name, last_name, ts(now)],
            )?;
        }
        Role::Admin => unreachable!("rejected above"),
    }

    let token = issue_session(&tx, &user_id, ttl_hours)?;
    tx.commit()?;

    Ok(AuthResponse {
        token,
        user: User {
            id: user_id,
            username,
            email,
            role,
            is_active: true,
            last_login: None,
            created_at: now,
        },
    })
}

fn unique_conflict(err: rusqlite::Error) -> ApiError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            ApiError::Conflict("User with this email or username already exists".to_string())
        }
        _ => ApiError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn).expect("schema");
        conn
    }

    fn request(username: &str, email: &str, role: Option<Role>) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "Passw0rd".to_string(),
            role,
            first_name: Some("Alice".to_string()),
            last_name: Some("Lee".to_string()),
        }
    }

    #[test]
    fn creates_user_and_student_profile() {
        let conn = conn();
        let resp = register(&conn, &request("alice", "Alice@X.com", None), 24).expect("register");
        assert_eq!(resp.user.role, Role::Student);
        // email is case-normalized
        assert_eq!(resp.user.email, "alice@x.com");

        let profiles: i64 = conn
            .query_row("SELECT COUNT(*) FROM student_profiles", [], |r| r.get(0))
            .expect("count");
        assert_eq!(profiles, 1);

        // the returned token is live
        assert!(crate::auth::resolve_session(&conn, &resp.token).is_ok());
    }

    #[test]
    fn recruiter_gets_recruiter_profile() {
        let conn = conn();
        register(&conn, &request("bob", "bob@x.com", Some(Role::Recruiter)), 24)
            .expect("register");
        let profiles: i64 = conn
            .query_row("SELECT COUNT(*) FROM recruiter_profiles", [], |r| r.get(0))
            .expect("count");
        assert_eq!(profiles, 1);
    }

    #[test]
    fn duplicate_email_or_username_conflicts() {
        let conn = conn();
        register(&conn, &request("alice", "alice@x.com", None), 24).expect("first");

        let err = register(&conn, &request("alice", "other@x.com", None), 24).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        let err = register(&conn, &request("alice2", "alice@x.com", None), 24).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let users: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .expect("count");
        assert_eq!(users, 1);
    }

    #[test]
    fn a_racing_duplicate_insert_maps_to_conflict() {
        let conn = conn();
        register(&conn, &request("alice", "alice@x.com", None), 24).expect("first");

        // a second writer landing between the duplicate check and the INSERT
        // hits the UNIQUE constraint
        let err = conn
            .execute(
                "INSERT INTO users (id, username, email, password_hash, role, is_active, created_at)
                 VALUES ('u2', 'alice2', 'alice@x.com', 'h', 'student', 1, '2026-01-01T00:00:00Z')",
                [],
            )
            .unwrap_err();
        assert!(matches!(unique_conflict(err), ApiError::Conflict(_)));

        // anything that is not a constraint violation stays a database error
        let err = conn.execute("INSERT INTO no_such_table VALUES (1)", []).unwrap_err();
        assert!(matches!(unique_conflict(err), ApiError::Database(_)));
    }

    #[test]
    fn admin_role_is_not_open_for_registration() {
        let conn = conn();
        let err = register(&conn, &request("eve", "eve@x.com", Some(Role::Admin)), 24).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
