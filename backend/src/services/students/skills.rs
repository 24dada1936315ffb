use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::profile::{Proficiency, Skill};
use common::requests::{AddSkillRequest, UpdateSkillRequest};
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{skill_from_row, SKILL_COLS};
use crate::db::{ts, Db};
use crate::error::{ApiError, FieldError};

pub(crate) async fn add_process(
    db: web::Data<Db>,
    user: AuthUser,
    payload: web::Json<AddSkillRequest>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManageStudentProfile)?;
    let conn = db.open()?;
    let skill = add_skill(&conn, &user.id, &payload)?;
    Ok(HttpResponse::Created().json(skill))
}

pub(crate) async fn update_process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
    payload: web::Json<UpdateSkillRequest>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManageStudentProfile)?;
    let conn = db.open()?;
    let skill = update_skill(&conn, &user.id, &path, &payload)?;
    Ok(HttpResponse::Ok().json(skill))
}

pub(crate) async fn remove_process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManageStudentProfile)?;
    let conn = db.open()?;
    remove_skill(&conn, &user.id, &path)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Skill removed" })))
}

pub(crate) fn add_skill(
    conn: &Connection,
    user_id: &str,
    req: &AddSkillRequest,
) -> Result<Skill, ApiError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Skill name is required".to_string()));
    }

    // names are unique per profile, compared case-insensitively
    let duplicate: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM skills WHERE user_id = ?1 AND name = ?2",
            params![user_id, name],
            |row| row.get(0),
        )
        .optional()?;
    if duplicate.is_some() {
        return Err(ApiError::Conflict("Skill already exists".to_string()));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let proficiency = req.proficiency.unwrap_or(Proficiency::Beginner);
    conn.execute(
        "INSERT INTO skills (id, user_id, name, proficiency, score) VALUES (?1, ?2, ?3, ?4, 0)",
        params![id, user_id, name, proficiency.as_str()],
    )?;

    fetch_skill(conn, user_id, &id)
}

pub(crate) fn update_skill(
    conn: &Connection,
    user_id: &str,
    skill_id: &str,
    req: &UpdateSkillRequest,
) -> Result<Skill, ApiError> {
    let mut sets: Vec<String> = Vec::new();
    let mut values: Vec<rusqlite::types::Value> = Vec::new();
    if let Some(proficiency) = req.proficiency {
        sets.push(format!("proficiency = ?{}", values.len() + 1));
        values.push(rusqlite::types::Value::Text(
            proficiency.as_str().to_string(),
        ));
    }
    if let Some(score) = req.score {
        if score > 100 {
            return Err(ApiError::Validation(vec![FieldError::new(
                "score",
                "Score must be between 0 and 100",
            )]));
        }
        sets.push(format!("score = ?{}", values.len() + 1));
        values.push(rusqlite::types::Value::Integer(i64::from(score)));
        // a manual score counts as an assessment touch
        sets.push(format!("last_assessed = ?{}", values.len() + 1));
        values.push(rusqlite::types::Value::Text(ts(Utc::now())));
    }
    if sets.is_empty() {
        return fetch_skill(conn, user_id, skill_id);
    }

    values.push(rusqlite::types::Value::Text(skill_id.to_string()));
    values.push(rusqlite::types::Value::Text(user_id.to_string()));
    let updated = conn.execute(
        &format!(
            "UPDATE skills SET {} WHERE id = ?{} AND user_id = ?{}",
            sets.join(", "),
            values.len() - 1,
            values.len()
        ),
        rusqlite::params_from_iter(values.iter()),
    )?;
    if updated == 0 {
        return Err(ApiError::NotFound("Skill not found".to_string()));
    }
    fetch_skill(conn, user_id, skill_id)
}

pub(crate) fn remove_skill(
    conn: &Connection,
    user_id: &str,
    skill_id: &str,
) -> Result<(), ApiError> {
    conn.execute(
        "DELETE FROM skill_endorsements WHERE skill_id = ?1
             AND EXISTS (SELECT 1 FROM skills WHERE id = ?1 AND user_id = ?2)",
        params![skill_id, user_id],
    )?;
    let deleted = conn.execute(
        "DELETE FROM skills WHERE id = ?1 AND user_id = ?2",
        params![skill_id, user_id],
    )?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Skill not found".to_string()));
    }
    Ok(())
}

fn fetch_skill(conn: &Connection, user_id: &str, skill_id: &str) -> Result<Skill, ApiError> {
    conn.query_row(
        &format!(
            "SELECT {} FROM skills WHERE id = ?1 AND user_id = ?2",
            SKILL_COLS
        ),
        params![skill_id, user_id],
        skill_from_row,
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound("Skill not found".to_string()))
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
                first_name: None,
                last_name: None,
            },
            24,
        )
        .expect("register");
        let id = resp.user.id;
        (conn, id)
    }

    fn add(conn: &Connection, user_id: &str, name: &str) -> Skill {
        add_skill(
            conn,
            user_id,
            &AddSkillRequest {
                name: name.to_string(),
                proficiency: None,
            },
        )
        .expect("add")
    }

    #[test]
    fn duplicate_name_conflicts_case_insensitively() {
        let (conn, id) = student_conn();
        add(&conn, &id, "Rust");
        let err = add_skill(
            &conn,
            &id,
            &AddSkillRequest {
                name: "rust".to_string(),
                proficiency: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn setting_a_score_stamps_last_assessed() {
        let (conn, id) = student_conn();
        let skill = add(&conn, &id, "SQL");
        assert!(skill.last_assessed.is_none());

        let updated = update_skill(
            &conn,
            &id,
            &skill.id,
            &UpdateSkillRequest {
                proficiency: None,
                score: Some(72),
            },
        )
        .expect("update");
        assert_eq!(updated.score, 72);
        assert!(updated.last_assessed.is_some());
    }

    #[test]
    fn an_out_of_range_score_is_rejected_unwritten() {
        let (conn, id) = student_conn();
        let skill = add(&conn, &id, "SQL");

        let err = update_skill(
            &conn,
            &id,
            &skill.id,
            &UpdateSkillRequest {
                proficiency: None,
                score: Some(150),
            },
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let (score, last_assessed): (i64, Option<String>) = conn
            .query_row(
                "SELECT score, last_assessed FROM skills WHERE id = ?1",
                params![skill.id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .expect("row");
        assert_eq!(score, 0);
        assert!(last_assessed.is_none());
    }

    #[test]
    fn removing_an_absent_skill_is_not_found() {
        let (conn, id) = student_conn();
        let err = remove_skill(&conn, &id, "nope").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn skills_are_scoped_to_their_owner() {
        let (conn, alice) = student_conn();
        let resp = register(
            &conn,
            &RegisterRequest {
                username: "bob".to_string(),
                email: "bob@x.com".to_string(),
                password: "Passw0rd".to_string(),
                role: None,
                first_name: None,
                last_name: None,
            },
            24,
        )
        .expect("register");
        let bob = resp.user.id;

        let skill = add(&conn, &alice, "Rust");
        let err = remove_skill(&conn, &bob, &skill.id).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
