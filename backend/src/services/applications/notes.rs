use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::application::Application;
use common::requests::NoteRequest;
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{application_from_row, APPLICATION_COLS};
use crate::db::{ts, Db};
use crate::error::ApiError;

use super::attach_notes;

pub(crate) async fn process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
    payload: web::Json<NoteRequest>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::TriageApplicants)?;
    let conn = db.open()?;
    let application = append_note(&conn, &user.id, &path, &payload.content)?;
    Ok(HttpResponse::Created().json(application))
}

/// Appends a note to an application owned by the calling recruiter.
pub(crate) fn append_note(
    conn: &Connection,
    recruiter_id: &str,
    application_id: &str,
    content: &str,
) -> Result<Application, ApiError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("Note content is required".to_string()));
    }

    let owned: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM applications WHERE id = ?1 AND recruiter_id = ?2",
            params![application_id, recruiter_id],
            |row| row.get(0),
        )
        .optional()?;
    if owned.is_none() {
        return Err(ApiError::NotFound("Application not found".to_string()));
    }

    conn.execute(
        "INSERT INTO application_notes (id, application_id, author_id, content, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            uuid::Uuid::new_v4().to_string(),
            application_id,
            recruiter_id,
            content,
            ts(Utc::now())
        ],
    )?;

    let mut application = conn.query_row(
        &format!("SELECT {} FROM applications WHERE id = ?1", APPLICATION_COLS),
        params![application_id],
        application_from_row,
    )?;
    attach_notes(conn, &mut application)?;
    Ok(application)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::applications::apply::apply;
    use crate::services::applications::test_support::{empty_apply, fixture};

    #[test]
    fn notes_append_in_order_with_author_attached() {
        let f = fixture();
        let app = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");

        append_note(&f.conn, &f.recruiter_id, &app.id, "Strong resume").expect("first");
        let with_notes =
            append_note(&f.conn, &f.recruiter_id, &app.id, "Call scheduled").expect("second");

        assert_eq!(with_notes.notes.len(), 2);
        assert_eq!(with_notes.notes[0].content, "Strong resume");
        assert_eq!(with_notes.notes[1].content, "Call scheduled");
        assert_eq!(with_notes.notes[0].author_username.as_deref(), Some("rita"));
    }

    #[test]
    fn another_recruiters_application_reads_as_absent() {
        let f = fixture();
        let app = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");
        let err = append_note(&f.conn, "other-recruiter", &app.id, "hm").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn blank_note_is_rejected() {
        let f = fixture();
        let app = apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");
        let err = append_note(&f.conn, &f.recruiter_id, &app.id, "   ").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
