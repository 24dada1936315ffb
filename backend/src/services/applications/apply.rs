use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::application::Application;
use common::requests::ApplyRequest;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{application_from_row, APPLICATION_COLS};
use crate::db::{ts, Db};
use crate::error::ApiError;
use crate::validation::validate_cover_letter;

#[derive(Debug, Deserialize)]
pub(crate) struct ApplyPayload {
    pub internship_id: String,
    #[serde(flatten)]
    pub body: ApplyRequest,
}

pub(crate) async fn process(
    db: web::Data<Db>,
    user: AuthUser,
    payload: web::Json<ApplyPayload>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ApplyToInternship)?;
    let conn = db.open()?;
    let application = apply(&conn, &user.id, &payload.internship_id, &payload.body)?;
    Ok(HttpResponse::Created().json(application))
}

/// Submits an application. The insert and the three counter bumps (the
/// internship's, the student's, the recruiter's) commit or roll back as one.
pub(crate) fn apply(
    conn: &Connection,
    student_id: &str,
    internship_id: &str,
    req: &ApplyRequest,
) -> Result<Application, ApiError> {
    validate_cover_letter(req.cover_letter.as_deref())?;

    let now = Utc::now();
    let tx = conn.unchecked_transaction()?;

    let internship: Option<(String, bool, bool, String)> = tx
        .query_row(
            "SELECT recruiter_id, is_active, is_approved, application_deadline
             FROM internships WHERE id = ?1",
            params![internship_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()?;
    let (recruiter_id, is_active, is_approved, deadline) = internship
        .ok_or_else(|| ApiError::NotFound("Internship not found".to_string()))?;

    if !is_active || !is_approved {
        return Err(ApiError::BadRequest(
            "This internship is not accepting applications".to_string(),
        ));
    }
    if crate::db::parse_ts(&deadline)? <= now {
        return Err(ApiError::BadRequest(
            "The application deadline has passed".to_string(),
        ));
    }

    let duplicate: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM applications WHERE student_id = ?1 AND internship_id = ?2",
            params![student_id, internship_id],
            |row| row.get(0),
        )
        .optional()?;
    if duplicate.is_some() {
        return Err(ApiError::Conflict(
            "You have already applied to this internship".to_string(),
        ));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let (resume_url, resume_filename) = match &req.resume {
        Some(r) => (Some(r.url.clone()), Some(r.filename.clone())),
        None => (None, None),
    };
    tx.execute(
        "INSERT INTO applications (id, student_id, internship_id, recruiter_id, status,
             cover_letter, resume_url, resume_filename, applied_at, last_updated)
         VALUES (?1, ?2, ?3, ?4, 'applied', ?5, ?6, ?7, ?8, ?8)",
        params![
            id,
            student_id,
            internship_id,
            recruiter_id,
            req.cover_letter,
            resume_url,
            resume_filename,
            ts(now)
        ],
    )?;

    tx.execute(
        "UPDATE internships SET applications_count = applications_count + 1 WHERE id = ?1",
        params![internship_id],
    )?;
    tx.execute(
        "UPDATE student_profiles SET applications_count = applications_count + 1
         WHERE user_id = ?1",
        params![student_id],
    )?;
    tx.execute(
        "UPDATE recruiter_profiles SET applications_received = applications_received + 1
         WHERE user_id = ?1",
        params![recruiter_id],
    )?;

    let application = tx.query_row(
        &format!("SELECT {} FROM applications WHERE id = ?1", APPLICATION_COLS),
        params![id],
        application_from_row,
    )?;
    tx.commit()?;
    Ok(application)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::applications::test_support::{empty_apply, fixture};
    use chrono::Duration;
    use common::model::application::ApplicationStatus;

    #[test]
    fn apply_bumps_all_three_counters_atomically() {
        let f = fixture();
        let app = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");
        assert_eq!(app.status, ApplicationStatus::Applied);
        assert_eq!(app.recruiter_id, f.recruiter_id);

        let internship_count: i64 = f
            .conn
            .query_row(
                "SELECT applications_count FROM internships WHERE id = ?1",
                params![f.internship_id],
                |r| r.get(0),
            )
            .expect("internships");
        let student_count: i64 = f
            .conn
            .query_row(
                "SELECT applications_count FROM student_profiles WHERE user_id = ?1",
                params![f.student_id],
                |r| r.get(0),
            )
            .expect("students");
        let received: i64 = f
            .conn
            .query_row(
                "SELECT applications_received FROM recruiter_profiles WHERE user_id = ?1",
                params![f.recruiter_id],
                |r| r.get(0),
            )
            .expect("recruiters");
        assert_eq!((internship_count, student_count, received), (1, 1, 1));
    }

    #[test]
    fn double_apply_conflicts_and_counters_stay_put() {
        let f = fixture();
        apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("first");
        let err = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let count: i64 = f
            .conn
            .query_row(
                "SELECT applications_count FROM internships WHERE id = ?1",
                params![f.internship_id],
                |r| r.get(0),
            )
            .expect("count");
        assert_eq!(count, 1);
    }

    #[test]
    fn expired_deadline_rejects_the_application() {
        let f = fixture();
        f.conn
            .execute(
                "UPDATE internships SET application_deadline = ?1 WHERE id = ?2",
                params![ts(Utc::now() - Duration::days(1)), f.internship_id],
            )
            .expect("expire");
        let err = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn unapproved_internship_is_not_open() {
        let f = fixture();
        f.conn
            .execute("UPDATE internships SET is_approved = 0 WHERE id = 'i1'", [])
            .expect("unapprove");
        let err = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn unknown_internship_is_not_found() {
        let f = fixture();
        let err = apply(&f.conn, &f.student_id, "nope", &empty_apply()).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
