use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::application::{Application, ApplicationStatus};
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{application_from_row, APPLICATION_COLS};
use crate::db::{ts, Db};
use crate::error::ApiError;

pub(crate) async fn process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManageOwnApplications)?;
    let conn = db.open()?;
    let application = withdraw(&conn, &user.id, &path)?;
    Ok(HttpResponse::Ok().json(application))
}

/// Student-driven terminal move. The lookup is scoped to the caller, so
/// someone else's application reads as absent. Gives back the slot in the
/// internship's counter.
pub(crate) fn withdraw(
    conn: &Connection,
    student_id: &str,
    application_id: &str,
) -> Result<Application, ApiError> {
    let tx = conn.unchecked_transaction()?;

    let row: Option<(String, String)> = tx
        .query_row(
            "SELECT status, internship_id FROM applications WHERE id = ?1 AND student_id = ?2",
            params![application_id, student_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    let (status_s, internship_id) =
        row.ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;
    let status = ApplicationStatus::parse(&status_s)
        .ok_or_else(|| ApiError::Internal(format!("corrupt status: {}", status_s)))?;

    if !status.can_transition(ApplicationStatus::Withdrawn) {
        return Err(ApiError::InvalidTransition(format!(
            "Cannot withdraw an application that is {}",
            status.as_str()
        )));
    }

    tx.execute(
        "UPDATE applications SET status = 'withdrawn', last_updated = ?1 WHERE id = ?2",
        params![ts(Utc::now()), application_id],
    )?;
    tx.execute(
        "UPDATE internships SET applications_count = MAX(applications_count - 1, 0)
         WHERE id = ?1",
        params![internship_id],
    )?;

    let application = tx.query_row(
        &format!("SELECT {} FROM applications WHERE id = ?1", APPLICATION_COLS),
        params![application_id],
        application_from_row,
    )?;
    tx.commit()?;
    Ok(application)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::applications::apply::apply;
    use crate::services::applications::test_support::{empty_apply, fixture};

    #[test]
    fn withdraw_frees_the_internship_slot() {
        let f = fixture();
        let app = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");

        let withdrawn = withdraw(&f.conn, &f.student_id, &app.id).expect("withdraw");
        assert_eq!(withdrawn.status, ApplicationStatus::Withdrawn);

        let count: i64 = f
            .conn
            .query_row(
                "SELECT applications_count FROM internships WHERE id = ?1",
                params![f.internship_id],
                |r| r.get(0),
            )
            .expect("count");
        assert_eq!(count, 0);
    }

    #[test]
    fn selected_application_cannot_be_withdrawn() {
        let f = fixture();
        let app = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");
        f.conn
            .execute(
                "UPDATE applications SET status = 'selected' WHERE id = ?1",
                params![app.id],
            )
            .expect("select");

        let err = withdraw(&f.conn, &f.student_id, &app.id).unwrap_err();
        assert!(matches!(err, ApiError::InvalidTransition(_)));
    }

    #[test]
    fn withdrawing_twice_is_rejected() {
        let f = fixture();
        let app = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");
        withdraw(&f.conn, &f.student_id, &app.id).expect("first");

        let err = withdraw(&f.conn, &f.student_id, &app.id).unwrap_err();
        assert!(matches!(err, ApiError::InvalidTransition(_)));

        // the counter is given back exactly once
        let count: i64 = f
            .conn
            .query_row(
                "SELECT applications_count FROM internships WHERE id = ?1",
                params![f.internship_id],
                |r| r.get(0),
            )
            .expect("count");
        assert_eq!(count, 0);
    }

    #[test]
    fn someone_elses_application_reads_as_absent() {
        let f = fixture();
        let app = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");
        let err = withdraw(&f.conn, "other-student", &app.id).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
