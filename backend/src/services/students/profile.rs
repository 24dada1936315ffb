use actix_web::{web, HttpResponse};
use common::model::profile::StudentProfile;
use common::requests::UpdateStudentProfileRequest;
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{skill_from_row, student_profile_from_row, SKILL_COLS, STUDENT_PROFILE_COLS};
use crate::db::{to_json, Db};
use crate::error::ApiError;
use crate::validation::validate_bio;

pub(crate) async fn get_process(
    db: web::Data<Db>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManageStudentProfile)?;
    let conn = db.open()?;
    Ok(HttpResponse::Ok().json(fetch_profile(&conn, &user.id)?))
}

pub(crate) async fn update_process(
    db: web::Data<Db>,
    user: AuthUser,
    payload: web::Json<UpdateStudentProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManageStudentProfile)?;
    let conn = db.open()?;
    update_profile(&conn, &user.id, &payload)?;
    Ok(HttpResponse::Ok().json(fetch_profile(&conn, &user.id)?))
}

/// Loads the profile with its skills and endorsements attached. Also used by
/// the `/api/auth/me` endpoint.
pub(crate) fn fetch_profile(conn: &Connection, user_id: &str) -> Result<StudentProfile, ApiError> {
    let mut profile = conn
        .query_row(
            &format!(
                "SELECT {} FROM student_profiles WHERE user_id = ?1",
                STUDENT_PROFILE_COLS
            ),
            params![user_id],
            student_profile_from_row,
        )
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Student profile not found".to_string()))?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM skills WHERE user_id = ?1 ORDER BY name",
        SKILL_COLS
    ))?;
    profile.skills = stmt
        .query_map(params![user_id], skill_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT skill_id, endorser_id FROM skill_endorsements
         WHERE skill_id IN (SELECT id FROM skills WHERE user_id = ?1)",
    )?;
    let endorsements = stmt
        .query_map(params![user_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for (skill_id, endorser_id) in endorsements {
        if let Some(skill) = profile.skills.iter_mut().find(|s| s.id == skill_id) {
            skill.endorsements.push(endorser_id);
        }
    }

    Ok(profile)
}

fn update_profile(
    conn: &Connection,
    user_id: &str,
    req: &UpdateStudentProfileRequest,
) -> Result<(), ApiError> {
    validate_bio(req.bio.as_deref())?;

    let mut sets: Vec<String> = Vec::new();
    let mut params: Vec<rusqlite::types::Value> = Vec::new();
    let mut push = |sets: &mut Vec<String>, column: &str, value: rusqlite::types::Value| {
        sets.push(format!("{} = ?{}", column, params.len() + 1));
        params.push(value);
    };

    use rusqlite::types::Value;
    if let Some(v) = &req.first_name {
        push(&mut sets, "first_name", Value::Text(v.trim().to_string()));
    }
    if let Some(v) = &req.last_name {
        push(&mut sets, "last_name", Value::Text(v.trim().to_string()));
    }
    if let Some(v) = &req.phone {
        push(&mut sets, "phone", Value::Text(v.clone()));
    }
    if let Some(v) = &req.location {
        push(&mut sets, "location", Value::Text(v.clone()));
    }
    if let Some(v) = &req.bio {
        push(&mut sets, "bio", Value::Text(v.clone()));
    }
    if let Some(v) = &req.avatar {
        push(&mut sets, "avatar", Value::Text(v.clone()));
    }
    if let Some(resume) = &req.resume {
        push(&mut sets, "resume_url", Value::Text(resume.url.clone()));
        push(
            &mut sets,
            "resume_filename",
            Value::Text(resume.filename.clone()),
        );
    }
    if let Some(v) = &req.education {
        push(&mut sets, "education", Value::Text(to_json(v)?));
    }
    if let Some(v) = &req.experience {
        push(&mut sets, "experience", Value::Text(to_json(v)?));
    }
    if let Some(v) = &req.portfolio {
        push(&mut sets, "portfolio", Value::Text(to_json(v)?));
    }
    if let Some(v) = &req.social_links {
        push(&mut sets, "social_links", Value::Text(to_json(v)?));
    }
    if let Some(v) = &req.preferences {
        push(&mut sets, "preferences", Value::Text(to_json(v)?));
    }

    if sets.is_empty() {
        return Ok(());
    }
    params.push(Value::Text(user_id.to_string()));
    let updated = conn.execute(
        &format!(
            "UPDATE student_profiles SET {} WHERE user_id = ?{}",
            sets.join(", "),
            params.len()
        ),
        rusqlite::params_from_iter(params.iter()),
    )?;
    if updated == 0 {
        return Err(ApiError::NotFound("Student profile not found".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::services::auth::register::register;
    use common::requests::RegisterRequest;

    fn student_conn() -> (Connection, String) {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn).expect("schema");
        let resp = register(
            &conn,
            &RegisterRequest {
                username: "alice".to_string(),
                email: "alice@x.com".to_string(),
                password: "Passw0rd".to_string(),
                role: None,
                first_name: Some("Alice".to_string()),
                last_name: Some("Lee".to_string()),
            },
            24,
        )
        .expect("register");
        let id = resp.user.id;
        (conn, id)
    }

    #[test]
    fn partial_update_keeps_untouched_fields() {
        let (conn, id) = student_conn();
        update_profile(
            &conn,
            &id,
            &UpdateStudentProfileRequest {
                bio: Some("Systems programmer".to_string()),
                ..Default::default()
            },
        )
        .expect("update");

        let profile = fetch_profile(&conn, &id).expect("fetch");
        assert_eq!(profile.first_name, "Alice");
        assert_eq!(profile.bio.as_deref(), Some("Systems programmer"));
    }

    #[test]
    fn overlong_bio_is_rejected() {
        let (conn, id) = student_conn();
        let err = update_profile(
            &conn,
            &id,
            &UpdateStudentProfileRequest {
                bio: Some("x".repeat(501)),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let (conn, id) = student_conn();
        update_profile(&conn, &id, &UpdateStudentProfileRequest::default()).expect("update");
        assert!(fetch_profile(&conn, &id).is_ok());
    }
}
