use actix_web::{web, HttpResponse};
use common::model::application::{Application, ApplicationStatus};
use common::model::internship::Internship;
use common::pagination::Paginated;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{application_from_row, internship_from_row, APPLICATION_COLS, INTERNSHIP_COLS};
use crate::db::{limit_offset, Db};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub(crate) struct MyApplicationsQuery {
    status: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApplicationWithInternship {
    #[serde(flatten)]
    pub(crate) application: Application,
    pub(crate) internship: Option<Internship>,
}

pub(crate) async fn process(
    db: web::Data<Db>,
    user: AuthUser,
    query: web::Query<MyApplicationsQuery>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManageOwnApplications)?;
    let conn = db.open()?;
    let (page, limit) = common::pagination::clamp(query.page, query.limit);
    let result = my_applications(&conn, &user.id, query.status.as_deref(), page, limit)?;
    Ok(HttpResponse::Ok().json(result))
}

/// The student's applications, newest first, optionally narrowed to one
/// status, each carrying its internship.
pub(crate) fn my_applications(
    conn: &Connection,
    student_id: &str,
    status: Option<&str>,
    page: u32,
    limit: u32,
) -> Result<Paginated<ApplicationWithInternship>, ApiError> {
    let mut where_sql = "student_id = ?".to_string();
    let mut filters: Vec<Value> = vec![Value::Text(student_id.to_string())];
    if let Some(status) = status.map(str::trim).filter(|s| !s.is_empty()) {
        let status = ApplicationStatus::parse(status)
            .ok_or_else(|| ApiError::BadRequest("Unknown application status".to_string()))?;
        where_sql.push_str(" AND status = ?");
        filters.push(Value::Text(status.as_str().to_string()));
    }

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM applications WHERE {}", where_sql),
        params_from_iter(filters.iter()),
        |row| row.get(0),
    )?;

    let (lim, offset) = limit_offset(page, limit);
    let mut page_params = filters.clone();
    page_params.push(Value::Integer(lim));
    page_params.push(Value::Integer(offset));

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM applications WHERE {} ORDER BY applied_at DESC LIMIT ? OFFSET ?",
        APPLICATION_COLS, where_sql
    ))?;
    let applications = stmt
        .query_map(params_from_iter(page_params.iter()), application_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut items = Vec::with_capacity(applications.len());
    for application in applications {
        let internship = conn
            .query_row(
                &format!("SELECT {} FROM internships WHERE id = ?1", INTERNSHIP_COLS),
                params![application.internship_id],
                internship_from_row,
            )
            .optional()?;
        items.push(ApplicationWithInternship {
            application,
            internship,
        });
    }

    Ok(Paginated::new(items, page, limit, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::applications::apply::apply;
    use crate::services::applications::test_support::{empty_apply, fixture};

    #[test]
    fn applications_come_back_with_their_internship() {
        let f = fixture();
        apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");

        let page = my_applications(&f.conn, &f.student_id, None, 1, 10).expect("list");
        assert_eq!(page.pagination.total, 1);
        let entry = &page.items[0];
        assert_eq!(entry.application.status, ApplicationStatus::Applied);
        let internship = entry.internship.as_ref().expect("internship");
        assert_eq!(internship.id, f.internship_id);
    }

    #[test]
    fn status_filter_narrows_and_unknown_values_are_rejected() {
        let f = fixture();
        apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");

        let applied = my_applications(&f.conn, &f.student_id, Some("applied"), 1, 10)
            .expect("applied");
        assert_eq!(applied.pagination.total, 1);

        let rejected = my_applications(&f.conn, &f.student_id, Some("rejected"), 1, 10)
            .expect("rejected");
        assert_eq!(rejected.pagination.total, 0);

        let err = my_applications(&f.conn, &f.student_id, Some("pending"), 1, 10).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn other_students_applications_stay_invisible() {
        let f = fixture();
        apply(&f.conn, &f.student_id, &f.internship_id, &empty_apply()).expect("apply");

        let page = my_applications(&f.conn, "someone-else", None, 1, 10).expect("list");
        assert_eq!(page.pagination.total, 0);
    }
}
