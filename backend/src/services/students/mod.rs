//! # Student Profile Module
//!
//! Student-role endpoints under `/api/students`: the caller's own profile,
//! its skill list and the skill-assessment history. All handlers gate on the
//! student role first; every lookup is scoped to the calling user.
//!
//! ## Sub-modules:
//! - `profile`: profile fetch and partial update.
//! - `skills`: add, update, remove; names are unique case-insensitively.
//! - `assessments`: attempt history and quiz submission grading.
//! - `stats`: the profile's denormalized counters.

pub(crate) mod profile;

mod assessments;
mod skills;
mod stats;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/students";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/profile", get().to(profile::get_process))
        .route("/profile", put().to(profile::update_process))
        .route("/skills", post().to(skills::add_process))
        .route("/skills/{skill_id}", put().to(skills::update_process))
        .route("/skills/{skill_id}", delete().to(skills::remove_process))
        .route("/assessments", get().to(assessments::list_process))
        .route("/assessments", post().to(assessments::submit_process))
        .route("/stats", get().to(stats::process))
}
