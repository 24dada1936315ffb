use actix_web::{web, HttpResponse};
use rusqlite::{params, Connection};

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::Db;
use crate::error::ApiError;
use crate::services::auth::fetch_user;

pub(crate) async fn toggle_status_process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::Moderate)?;
    let conn = db.open()?;
    let subject = toggle_status(&conn, &user.id, &path)?;
    Ok(HttpResponse::Ok().json(subject))
}

/// Flips an account between active and deactivated. Deactivation also drops
/// the account's live sessions, so outstanding tokens stop working at once.
fn toggle_status(
    conn: &Connection,
    admin_id: &str,
    subject_id: &str,
) -> Result<common::model::user::User, ApiError> {
    if admin_id == subject_id {
        return Err(ApiError::BadRequest(
            "You cannot deactivate your own account".to_string(),
        ));
    }

    let tx = conn.unchecked_transaction()?;
    let updated = tx.execute(
        "UPDATE users SET is_active = NOT is_active WHERE id = ?1",
        params![subject_id],
    )?;
    if updated == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    tx.execute(
        "DELETE FROM sessions WHERE user_id = ?1
             AND (SELECT is_active FROM users WHERE id = ?1) = 0",
        params![subject_id],
    )?;
    let subject = fetch_user(&tx, subject_id)?;
    tx.commit()?;
    Ok(subject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::services::applications::test_support::register_user;
    use crate::services::auth::login::login;
    use common::model::user::Role;
    use common::requests::LoginRequest;

    #[test]
    fn deactivation_revokes_sessions_and_blocks_login() {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn).expect("schema");
        let alice = register_user(&conn, "alice", "alice@x.com", Role::Student);
        let token = login(
            &conn,
            &LoginRequest {
                email: "alice@x.com".to_string(),
                password: "Passw0rd".to_string(),
            },
            24,
        )
        .expect("login")
        .token;

        let subject = toggle_status(&conn, "admin-1", &alice).expect("toggle");
        assert!(!subject.is_active);
        assert!(crate::auth::resolve_session(&conn, &token).is_err());

        // toggling back restores access
        let subject = toggle_status(&conn, "admin-1", &alice).expect("toggle back");
        assert!(subject.is_active);
        assert!(login(
            &conn,
            &LoginRequest {
                email: "alice@x.com".to_string(),
                password: "Passw0rd".to_string(),
            },
            24,
        )
        .is_ok());
    }

    #[test]
    fn admins_cannot_toggle_themselves() {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn).expect("schema");
        let err = toggle_status(&conn, "a1", "a1").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
