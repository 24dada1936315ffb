use actix_web::{web, HttpResponse};
use common::model::profile::RecruiterProfile;
use common::requests::UpdateRecruiterProfileRequest;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{recruiter_profile_from_row, RECRUITER_PROFILE_COLS};
use crate::db::{to_json, Db};
use crate::error::ApiError;
use crate::validation::validate_bio;

pub(crate) async fn get_process(
    db: web::Data<Db>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManagePostings)?;
    let conn = db.open()?;
    Ok(HttpResponse::Ok().json(fetch_profile(&conn, &user.id)?))
}

pub(crate) async fn update_process(
    db: web::Data<Db>,
    user: AuthUser,
    payload: web::Json<UpdateRecruiterProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManagePostings)?;
    let conn = db.open()?;
    update_profile(&conn, &user.id, &payload)?;
    Ok(HttpResponse::Ok().json(fetch_profile(&conn, &user.id)?))
}

/// Also used by the `/api/auth/me` endpoint.
pub(crate) fn fetch_profile(
    conn: &Connection,
    user_id: &str,
) -> Result<RecruiterProfile, ApiError> {
    conn.query_row(
        &format!(
            "SELECT {} FROM recruiter_profiles WHERE user_id = ?1",
            RECRUITER_PROFILE_COLS
        ),
        params![user_id],
        recruiter_profile_from_row,
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound("Recruiter profile not found".to_string()))
}

/// Partial update; `is_verified` is deliberately not settable here.
fn update_profile(
    conn: &Connection,
    user_id: &str,
    req: &UpdateRecruiterProfileRequest,
) -> Result<(), ApiError> {
    validate_bio(req.bio.as_deref())?;

    let mut sets: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    let text_fields: [(&str, &Option<String>); 11] = [
        ("first_name", &req.first_name),
        ("last_name", &req.last_name),
        ("company", &req.company),
        ("position", &req.position),
        ("phone", &req.phone),
        ("location", &req.location),
        ("bio", &req.bio),
        ("avatar", &req.avatar),
        ("company_logo", &req.company_logo),
        ("company_website", &req.company_website),
        ("company_size", &req.company_size),
    ];
    for (column, value) in text_fields {
        if let Some(v) = value {
            sets.push(format!("{} = ?{}", column, values.len() + 1));
            values.push(Value::Text(v.trim().to_string()));
        }
    }
    if let Some(v) = &req.industry {
        sets.push(format!("industry = ?{}", values.len() + 1));
        values.push(Value::Text(v.trim().to_string()));
    }
    if let Some(v) = &req.social_links {
        sets.push(format!("social_links = ?{}", values.len() + 1));
        values.push(Value::Text(to_json(v)?));
    }

    if sets.is_empty() {
        return Ok(());
    }
    values.push(Value::Text(user_id.to_string()));
    let updated = conn.execute(
        &format!(
            "UPDATE recruiter_profiles SET {} WHERE user_id = ?{}",
            sets.join(", "),
            values.len()
        ),
        rusqlite::params_from_iter(values.iter()),
    )?;
    if updated == 0 {
        return Err(ApiError::NotFound(
            "Recruiter profile not found".to_string(),
        ));
    }
    Ok(())
}
