//! Application status moves driven by the owning recruiter.
//!
//! Every move goes through the lifecycle state machine; the status write,
//! the optional note and the counter bumps commit as one transaction.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::application::{Application, ApplicationStatus};
use common::requests::StatusUpdateRequest;
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{application_from_row, APPLICATION_COLS};
use crate::db::{ts, Db};
use crate::error::ApiError;
use crate::services::applications::attach_notes;

pub(crate) async fn process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
    payload: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::TriageApplicants)?;
    let conn = db.open()?;
    let application = update_status(&conn, &user.id, &path, &payload)?;
    Ok(HttpResponse::Ok().json(application))
}

pub(crate) fn update_status(
    conn: &Connection,
    recruiter_id: &str,
    application_id: &str,
    req: &StatusUpdateRequest,
) -> Result<Application, ApiError> {
    // withdrawing is the student's move
    if req.status == ApplicationStatus::Withdrawn {
        return Err(ApiError::InvalidTransition(
            "Only the applicant can withdraw an application".to_string(),
        ));
    }

    let tx = conn.unchecked_transaction()?;

    let row: Option<(String, String)> = tx
        .query_row(
            "SELECT status, student_id FROM applications WHERE id = ?1 AND recruiter_id = ?2",
            params![application_id, recruiter_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    let (status_s, student_id) =
        row.ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;
    let current = ApplicationStatus::parse(&status_s)
        .ok_or_else(|| ApiError::Internal(format!("corrupt status: {}", status_s)))?;

    if !current.can_transition(req.status) {
        return Err(ApiError::InvalidTransition(format!(
            "Cannot move an application from {} to {}",
            current.as_str(),
            req.status.as_str()
        )));
    }

    let now = ts(Utc::now());
    tx.execute(
        "UPDATE applications SET status = ?1, last_updated = ?2 WHERE id = ?3",
        params![req.status.as_str(), now, application_id],
    )?;

    match req.status {
        ApplicationStatus::Shortlisted => {
            tx.execute(
                "UPDATE student_profiles SET shortlisted_count = shortlisted_count + 1
                 WHERE user_id = ?1",
                params![student_id],
            )?;
        }
        ApplicationStatus::Selected => {
            tx.execute(
                "UPDATE student_profiles SET selected_count = selected_count + 1
                 WHERE user_id = ?1",
                params![student_id],
            )?;
            tx.execute(
                "UPDATE recruiter_profiles SET candidates_hired = candidates_hired + 1
                 WHERE user_id = ?1",
                params![recruiter_id],
            )?;
        }
        _ => {}
    }

    if let Some(note) = req.notes.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        tx.execute(
            "INSERT INTO application_notes (id, application_id, author_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                uuid::Uuid::new_v4().to_string(),
                application_id,
                recruiter_id,
                note,
                now
            ],
        )?;
    }

    let mut application = tx.query_row(
        &format!("SELECT {} FROM applications WHERE id = ?1", APPLICATION_COLS),
        params![application_id],
        application_from_row,
    )?;
    attach_notes(&tx, &mut application)?;
    tx.commit()?;
    Ok(application)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::applications::apply::apply;
    use crate::services::applications::test_support::{empty_apply, fixture, Fixture};

    fn applied(f: &Fixture) -> Application {
        apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply")
    }

    fn request(status: ApplicationStatus) -> StatusUpdateRequest {
        StatusUpdateRequest {
            status,
            notes: None,
        }
    }

    fn student_counts(f: &Fixture) -> (i64, i64) {
        f.conn
            .query_row(
                "SELECT shortlisted_count, selected_count FROM student_profiles
                 WHERE user_id = ?1",
                params![f.student_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .expect("counts")
    }

    #[test]
    fn shortlisting_bumps_the_student_counter() {
        let f = fixture();
        let app = applied(&f);
        let updated = update_status(
            &f.conn,
            &f.recruiter_id,
            &app.id,
            &request(ApplicationStatus::Shortlisted),
        )
        .expect("update");
        assert_eq!(updated.status, ApplicationStatus::Shortlisted);
        assert_eq!(student_counts(&f), (1, 0));
    }

    #[test]
    fn selecting_bumps_both_sides_once() {
        let f = fixture();
        let app = applied(&f);
        update_status(
            &f.conn,
            &f.recruiter_id,
            &app.id,
            &request(ApplicationStatus::Selected),
        )
        .expect("select");

        // terminal: a second select is rejected and nothing double-counts
        let err = update_status(
            &f.conn,
            &f.recruiter_id,
            &app.id,
            &request(ApplicationStatus::Selected),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidTransition(_)));

        assert_eq!(student_counts(&f), (0, 1));
        let hired: i64 = f
            .conn
            .query_row(
                "SELECT candidates_hired FROM recruiter_profiles WHERE user_id = ?1",
                params![f.recruiter_id],
                |r| r.get(0),
            )
            .expect("hired");
        assert_eq!(hired, 1);
    }

    #[test]
    fn backward_moves_are_rejected() {
        let f = fixture();
        let app = applied(&f);
        update_status(
            &f.conn,
            &f.recruiter_id,
            &app.id,
            &request(ApplicationStatus::Interview),
        )
        .expect("interview");

        let err = update_status(
            &f.conn,
            &f.recruiter_id,
            &app.id,
            &request(ApplicationStatus::Shortlisted),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidTransition(_)));
    }

    #[test]
    fn recruiters_cannot_withdraw() {
        let f = fixture();
        let app = applied(&f);
        let err = update_status(
            &f.conn,
            &f.recruiter_id,
            &app.id,
            &request(ApplicationStatus::Withdrawn),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidTransition(_)));
    }

    #[test]
    fn a_note_rides_along_with_the_move() {
        let f = fixture();
        let app = applied(&f);
        let updated = update_status(
            &f.conn,
            &f.recruiter_id,
            &app.id,
            &StatusUpdateRequest {
                status: ApplicationStatus::Shortlisted,
                notes: Some("Good portfolio".to_string()),
            },
        )
        .expect("update");
        assert_eq!(updated.notes.len(), 1);
        assert_eq!(updated.notes[0].content, "Good portfolio");
    }

    #[test]
    fn other_recruiters_applications_read_as_absent() {
        let f = fixture();
        let app = applied(&f);
        let err = update_status(
            &f.conn,
            "other",
            &app.id,
            &request(ApplicationStatus::Shortlisted),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
