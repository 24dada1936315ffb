//! # Recruiter Workspace Module
//!
//! Recruiter-role endpoints under `/api/recruiters`: the recruiter's own
//! profile, its internship postings and applicant triage. Every posting and
//! application lookup is scoped to the calling recruiter, so resources owned
//! by someone else read as absent.
//!
//! ## Sub-modules:
//! - `profile`: profile fetch and partial update.
//! - `internships`: posting create, list, update and cascading delete.
//! - `applicants`: applicants per posting and across all postings.
//! - `status`: application status moves through the lifecycle state machine.
//! - `update`: notes and feedback on an application, status untouched.
//! - `interview`: interview scheduling, moves the application to `interview`.
//! - `stats`: the profile's counters plus live posting aggregates.

pub(crate) mod profile;

mod applicants;
mod internships;
mod interview;
mod stats;
mod status;
mod update;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/recruiters";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/profile", get().to(profile::get_process))
        .route("/profile", put().to(profile::update_process))
        .route("/internships", post().to(internships::create_process))
        .route("/internships", get().to(internships::list_process))
        .route("/internships/{id}", put().to(internships::update_process))
        .route("/internships/{id}", delete().to(internships::delete_process))
        .route(
            "/internships/{id}/applicants",
            get().to(applicants::per_internship_process),
        )
        .route("/applicants", get().to(applicants::across_all_process))
        .route("/applications/{id}", put().to(update::process))
        .route("/applications/{id}/status", put().to(status::process))
        .route(
            "/applications/{id}/interview",
            put().to(interview::process),
        )
        .route("/stats", get().to(stats::process))
}
