use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::application::Application;
use common::requests::UpdateApplicationRequest;
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{application_from_row, APPLICATION_COLS};
use crate::db::{ts, Db};
use crate::error::ApiError;
use crate::services::applications::attach_notes;
use crate::validation::validate_rating;

pub(crate) async fn process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
    payload: web::Json<UpdateApplicationRequest>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::TriageApplicants)?;
    let conn = db.open()?;
    let application = update_application(&conn, &user.id, &path, &payload)?;
    Ok(HttpResponse::Ok().json(application))
}

/// Appends a note and/or records feedback on an application owned by the
/// calling recruiter, without touching the status.
pub(crate) fn update_application(
    conn: &Connection,
    recruiter_id: &str,
    application_id: &str,
    req: &UpdateApplicationRequest,
) -> Result<Application, ApiError> {
    let tx = conn.unchecked_transaction()?;

    let owned: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM applications WHERE id = ?1 AND recruiter_id = ?2",
            params![application_id, recruiter_id],
            |row| row.get(0),
        )
        .optional()?;
    if owned.is_none() {
        return Err(ApiError::NotFound("Application not found".to_string()));
    }

    let now = ts(Utc::now());
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
    if let Some(feedback) = &req.feedback {
        validate_rating(feedback.rating)?;
        tx.execute(
            "UPDATE applications SET feedback_rating = ?1, feedback_comments = ?2,
                 feedback_by = ?3, feedback_at = ?4, last_updated = ?4
             WHERE id = ?5",
            params![
                feedback.rating,
                feedback.comments,
                recruiter_id,
                now,
                application_id
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
    use crate::services::applications::test_support::{empty_apply, fixture};
    use common::requests::FeedbackRequest;

    #[test]
    fn feedback_is_recorded_with_its_author() {
        let f = fixture();
        let app = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");

        let updated = update_application(
            &f.conn,
            &f.recruiter_id,
            &app.id,
            &UpdateApplicationRequest {
                notes: Some("Great culture fit".to_string()),
                feedback: Some(FeedbackRequest {
                    rating: 4,
                    comments: Some("Solid fundamentals".to_string()),
                }),
            },
        )
        .expect("update");

        let feedback = updated.feedback.expect("feedback");
        assert_eq!(feedback.rating, 4);
        assert_eq!(feedback.given_by, f.recruiter_id);
        assert_eq!(updated.notes.len(), 1);
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let f = fixture();
        let app = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");

        let err = update_application(
            &f.conn,
            &f.recruiter_id,
            &app.id,
            &UpdateApplicationRequest {
                notes: None,
                feedback: Some(FeedbackRequest {
                    rating: 6,
                    comments: None,
                }),
            },
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let rating: Option<i64> = f
            .conn
            .query_row(
                "SELECT feedback_rating FROM applications WHERE id = ?1",
                params![app.id],
                |r| r.get(0),
            )
            .expect("rating");
        assert!(rating.is_none());
    }
}
