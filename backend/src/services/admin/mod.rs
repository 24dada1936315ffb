//! # Platform Moderation Module
//!
//! Admin-role endpoints under `/api/admin`: platform analytics, user and
//! profile listings, posting moderation and account toggling. Everything
//! here gates on the admin role.
//!
//! ## Sub-modules:
//! - `analytics`: platform-wide aggregates.
//! - `students`: student listing and per-student detail.
//! - `recruiters`: recruiter listing and verification.
//! - `internships`: posting listing, approve and reject.
//! - `users`: account activation toggle.

mod analytics;
mod internships;
mod recruiters;
mod students;
mod users;

use actix_web::web::{get, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/admin";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/analytics", get().to(analytics::process))
        .route("/students", get().to(students::list_process))
        .route("/students/{id}", get().to(students::detail_process))
        .route("/recruiters", get().to(recruiters::list_process))
        .route("/recruiters/{id}/verify", put().to(recruiters::verify_process))
        .route("/internships", get().to(internships::list_process))
        .route("/internships/{id}/approve", put().to(internships::approve_process))
        .route("/internships/{id}/reject", put().to(internships::reject_process))
        .route("/users/{id}/toggle-status", put().to(users::toggle_status_process))
}
