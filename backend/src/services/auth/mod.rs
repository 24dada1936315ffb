//! # Identity Service Module
//!
//! Aggregates the identity-lifecycle endpoints under `/api/auth`: open
//! registration and login, and the session-scoped logout, current-user and
//! password-change operations.
//!
//! ## Sub-modules:
//! - `register`: account + role-matching profile creation, returns a session token.
//! - `login`: credential check, last-login stamp, returns a session token.
//! - `logout`: revokes the calling session.
//! - `me`: the caller's identity with its role profile attached.
//! - `update_password`: password rotation, returns a fresh session token.

pub(crate) mod login;
pub(crate) mod register;

mod logout;
mod me;
mod update_password;

use actix_web::web::{get, post, put, scope};
use actix_web::Scope;

use common::model::user::User;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::map::{user_from_row, USER_COLS};
use crate::error::ApiError;

const API_PATH: &str = "/api/auth";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/register", post().to(register::process))
        .route("/login", post().to(login::process))
        .route("/logout", post().to(logout::process))
        .route("/me", get().to(me::process))
        .route("/updatepassword", put().to(update_password::process))
}

pub(crate) fn fetch_user(conn: &Connection, id: &str) -> Result<User, ApiError> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
        params![id],
        user_from_row,
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}
