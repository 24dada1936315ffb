use actix_web::{web, HttpResponse};
use common::model::profile::{RecruiterProfile, StudentProfile};
use common::model::user::{Role, User};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::db::Db;
use crate::error::ApiError;

use super::fetch_user;

#[derive(Serialize)]
struct MeResponse {
    user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    student_profile: Option<StudentProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recruiter_profile: Option<RecruiterProfile>,
}

/// The caller's identity with its role profile attached.
pub(crate) async fn process(db: web::Data<Db>, user: AuthUser) -> Result<HttpResponse, ApiError> {
    let conn = db.open()?;
    let identity = fetch_user(&conn, &user.id)?;

    let mut response = MeResponse {
        user: identity,
        student_profile: None,
        recruiter_profile: None,
    };
    match user.role {
        Role::Student => {
            response.student_profile =
                Some(crate::services::students::profile::fetch_profile(&conn, &user.id)?);
        }
        Role::Recruiter => {
            response.recruiter_profile =
                Some(crate::services::recruiters::profile::fetch_profile(&conn, &user.id)?);
        }
        Role::Admin => {}
    }
    Ok(HttpResponse::Ok().json(response))
}
