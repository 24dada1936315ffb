//! Session-token authentication.
//!
//! Login and registration issue an opaque bearer token stored in the
//! `sessions` table next to its expiry. Every protected handler takes an
//! [`AuthUser`] extractor argument, which resolves the `Authorization:
//! Bearer` header against that table and rejects missing, expired or
//! revoked tokens as well as deactivated accounts with 401.
//!
//! Password hashing uses argon2; the hash never leaves this module.

pub mod policy;

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use common::model::user::Role;
use futures_util::future::{ready, Ready};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{parse_ts, ts, Db};
use crate::error::ApiError;

/// The authenticated caller, resolved once per request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub role: Role,
    /// The raw bearer token, kept so logout can revoke exactly this session.
    pub token: String,
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<AuthUser, ApiError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    let token = bearer_token(req)?;
    let db = req
        .app_data::<web::Data<Db>>()
        .ok_or_else(|| ApiError::Internal("database state not configured".to_string()))?;
    let conn = db.open()?;
    resolve_session(&conn, &token)
}

fn bearer_token(req: &HttpRequest) -> Result<String, ApiError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Authentication("Not authorized, no token".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Authentication("Not authorized, no token".to_string()))
}

/// Looks a bearer token up and returns the identity it belongs to.
///
/// Expired sessions are deleted on sight; a token for a deactivated user is
/// rejected even while the session row still exists.
pub fn resolve_session(conn: &Connection, token: &str) -> Result<AuthUser, ApiError> {
    let row = conn
        .query_row(
            "SELECT s.expires_at, u.id, u.username, u.role, u.is_active
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = ?1",
            params![token],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, bool>(4)?,
                ))
            },
        )
        .optional()?;

    let (expires_at, id, username, role_s, is_active) = row
        .ok_or_else(|| ApiError::Authentication("Not authorized, invalid token".to_string()))?;

    if parse_ts(&expires_at)? <= Utc::now() {
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        return Err(ApiError::Authentication(
            "Not authorized, token expired".to_string(),
        ));
    }
    if !is_active {
        return Err(ApiError::Authentication(
            "Your account has been deactivated".to_string(),
        ));
    }
    let role = Role::parse(&role_s)
        .ok_or_else(|| ApiError::Internal(format!("unknown role in storage: {}", role_s)))?;

    Ok(AuthUser {
        id,
        username,
        role,
        token: token.to_string(),
    })
}

/// Creates a session row for the user and returns the bearer token.
pub fn issue_session(
    conn: &Connection,
    user_id: &str,
    ttl_hours: i64,
) -> Result<String, ApiError> {
    let token = uuid::Uuid::new_v4().to_string();
    let expires_at = ts(Utc::now() + Duration::hours(ttl_hours));
    conn.execute(
        "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
        params![token, user_id, expires_at],
    )?;
    Ok(token)
}

/// Revokes one session. Revoking an already-deleted token is a no-op.
pub fn revoke_session(conn: &Connection, token: &str) -> Result<(), ApiError> {
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

pub fn hash_password(plaintext: &str) -> Result<String, ApiError> {
    use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
    let salt = SaltString::generate(&mut OsRng);
    argon2::Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    use argon2::password_hash::{PasswordHash, PasswordVerifier};
    match PasswordHash::new(hash) {
        Ok(parsed) => argon2::Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
