use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::application::{Application, ApplicationStatus};
use common::requests::ScheduleInterviewRequest;
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
    payload: web::Json<ScheduleInterviewRequest>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::TriageApplicants)?;
    let conn = db.open()?;
    let application = schedule_interview(&conn, &user.id, &path, &payload)?;
    Ok(HttpResponse::Ok().json(application))
}

/// Records the schedule and moves the application to `interview` unless it
/// is already there. Allowed from any non-terminal state.
pub(crate) fn schedule_interview(
    conn: &Connection,
    recruiter_id: &str,
    application_id: &str,
    req: &ScheduleInterviewRequest,
) -> Result<Application, ApiError> {
    let tx = conn.unchecked_transaction()?;

    let status_s: Option<String> = tx
        .query_row(
            "SELECT status FROM applications WHERE id = ?1 AND recruiter_id = ?2",
            params![application_id, recruiter_id],
            |row| row.get(0),
        )
        .optional()?;
    let status_s = status_s.ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;
    let current = ApplicationStatus::parse(&status_s)
        .ok_or_else(|| ApiError::Internal(format!("corrupt status: {}", status_s)))?;

    if current.is_terminal() {
        return Err(ApiError::InvalidTransition(format!(
            "Cannot schedule an interview for a {} application",
            current.as_str()
        )));
    }
    tx.execute(
        "UPDATE applications SET status = ?1, interview_date = ?2, interview_time = ?3,
             interview_location = ?4, interview_type = ?5, interview_notes = ?6,
             last_updated = ?7
         WHERE id = ?8",
        params![
            ApplicationStatus::Interview.as_str(),
            ts(req.date),
            req.time,
            req.location,
            req.interview_type.as_str(),
            req.notes,
            ts(Utc::now()),
            application_id
        ],
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
    use common::model::application::InterviewType;

    fn request() -> ScheduleInterviewRequest {
        ScheduleInterviewRequest {
            date: Utc::now() + chrono::Duration::days(7),
            time: "14:00".to_string(),
            location: None,
            interview_type: InterviewType::Video,
            notes: Some("Bring a laptop".to_string()),
        }
    }

    #[test]
    fn scheduling_moves_to_interview_and_records_the_slot() {
        let f = fixture();
        let app = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");

        let updated =
            schedule_interview(&f.conn, &f.recruiter_id, &app.id, &request()).expect("schedule");
        assert_eq!(updated.status, ApplicationStatus::Interview);
        let schedule = updated.interview_schedule.expect("schedule");
        assert_eq!(schedule.time, "14:00");
        assert_eq!(schedule.interview_type, InterviewType::Video);
    }

    #[test]
    fn rescheduling_keeps_the_interview_state() {
        let f = fixture();
        let app = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");
        schedule_interview(&f.conn, &f.recruiter_id, &app.id, &request()).expect("first");

        let mut second = request();
        second.time = "16:30".to_string();
        let updated =
            schedule_interview(&f.conn, &f.recruiter_id, &app.id, &second).expect("second");
        assert_eq!(updated.status, ApplicationStatus::Interview);
        assert_eq!(updated.interview_schedule.expect("schedule").time, "16:30");
    }

    #[test]
    fn terminal_applications_cannot_be_scheduled() {
        let f = fixture();
        let app = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");
        f.conn
            .execute(
                "UPDATE applications SET status = 'rejected' WHERE id = ?1",
                params![app.id],
            )
            .expect("reject");

        let err = schedule_interview(&f.conn, &f.recruiter_id, &app.id, &request()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidTransition(_)));
    }
}
