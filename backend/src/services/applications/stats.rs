use actix_web::{web, HttpResponse};
use common::model::user::Role;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::auth::AuthUser;
use crate::db::Db;
use crate::error::ApiError;

#[derive(Serialize)]
struct MonthBucket {
    month: String,
    count: i64,
}

#[derive(Serialize)]
struct ApplicationStats {
    total: i64,
    by_status: BTreeMap<String, i64>,
    /// The 12 most recent months that saw applications, oldest first.
    monthly: Vec<MonthBucket>,
}

/// Application stats scoped to the caller: a student sees its own
/// applications, a recruiter the ones on its postings, an admin all of them.
pub(crate) async fn process(db: web::Data<Db>, user: AuthUser) -> Result<HttpResponse, ApiError> {
    let conn = db.open()?;
    let stats = match user.role {
        Role::Student => scoped_stats(&conn, "student_id = ?1", Some(&user.id))?,
        Role::Recruiter => scoped_stats(&conn, "recruiter_id = ?1", Some(&user.id))?,
        Role::Admin => scoped_stats(&conn, "1 = 1", None)?,
    };
    Ok(HttpResponse::Ok().json(stats))
}

fn scoped_stats(
    conn: &Connection,
    scope_sql: &str,
    scope_id: Option<&str>,
) -> Result<ApplicationStats, ApiError> {
    let run_count = |sql: &str| -> Result<i64, ApiError> {
        let n = match scope_id {
            Some(id) => conn.query_row(sql, params![id], |row| row.get(0))?,
            None => conn.query_row(sql, [], |row| row.get(0))?,
        };
        Ok(n)
    };

    let total = run_count(&format!(
        "SELECT COUNT(*) FROM applications WHERE {}",
        scope_sql
    ))?;

    let mut stmt = conn.prepare(&format!(
        "SELECT status, COUNT(*) FROM applications WHERE {} GROUP BY status",
        scope_sql
    ))?;
    let by_status = match scope_id {
        Some(id) => stmt
            .query_map(params![id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?,
        None => stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?,
    };

    // applied_at is RFC 3339, so the first 7 characters are the year-month
    let mut stmt = conn.prepare(&format!(
        "SELECT month, n FROM (
             SELECT substr(applied_at, 1, 7) AS month, COUNT(*) AS n
             FROM applications WHERE {}
             GROUP BY month ORDER BY month DESC LIMIT 12
         ) ORDER BY month",
        scope_sql
    ))?;
    let monthly = match scope_id {
        Some(id) => stmt
            .query_map(params![id], |row| {
                Ok(MonthBucket {
                    month: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        None => stmt
            .query_map([], |row| {
                Ok(MonthBucket {
                    month: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?,
    };

    Ok(ApplicationStats {
        total,
        by_status,
        monthly,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::applications::test_support::fixture;
    use rusqlite::params;

    fn insert_application(
        conn: &Connection,
        id: &str,
        student: &str,
        internship: &str,
        recruiter: &str,
        status: &str,
        applied_at: &str,
    ) {
        conn.execute(
            "INSERT INTO applications (id, student_id, internship_id, recruiter_id, status,
                 applied_at, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![id, student, internship, recruiter, status, applied_at],
        )
        .expect("insert");
    }

    fn insert_user(conn: &Connection, id: &str, role: &str) {
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, role, created_at)
             VALUES (?1, ?1, ?1 || '@x.com', 'h', ?2, '2026-01-01T00:00:00+00:00')",
            params![id, role],
        )
        .expect("user");
    }

    #[test]
    fn buckets_come_back_oldest_first_and_scoped() {
        let f = fixture();
        insert_user(&f.conn, "someone-else", "student");
        insert_user(&f.conn, "other-recruiter", "recruiter");
        f.conn
            .execute(
                "INSERT INTO internships (id, recruiter_id, title, company, description, location,
                     work_type, duration, start_date, industry, application_deadline, openings,
                     is_active, is_approved, posted_at)
                 VALUES ('i2', 'other-recruiter', 'T', 'Acme', 'D', 'Remote', 'remote',
                     '3 months', '2026-01-01T00:00:00+00:00', 'Tech',
                     '2026-12-31T00:00:00+00:00', 1, 1, 1, '2026-01-01T00:00:00+00:00')",
                [],
            )
            .expect("internship");
        insert_application(
            &f.conn,
            "a1",
            &f.student_id,
            &f.internship_id,
            &f.recruiter_id,
            "applied",
            "2026-06-10T00:00:00+00:00",
        );
        insert_application(
            &f.conn,
            "a2",
            "someone-else",
            &f.internship_id,
            &f.recruiter_id,
            "shortlisted",
            "2026-07-02T00:00:00+00:00",
        );
        insert_application(
            &f.conn,
            "a3",
            &f.student_id,
            "i2",
            "other-recruiter",
            "rejected",
            "2026-07-15T00:00:00+00:00",
        );

        let student = scoped_stats(&f.conn, "student_id = ?1", Some(&f.student_id)).expect("s");
        assert_eq!(student.total, 2);
        assert_eq!(student.monthly[0].month, "2026-06");
        assert_eq!(student.monthly[1].month, "2026-07");

        let recruiter =
            scoped_stats(&f.conn, "recruiter_id = ?1", Some(&f.recruiter_id)).expect("r");
        assert_eq!(recruiter.total, 2);
        assert_eq!(recruiter.by_status.get("shortlisted"), Some(&1));

        let all = scoped_stats(&f.conn, "1 = 1", None).expect("a");
        assert_eq!(all.total, 3);
    }
}
