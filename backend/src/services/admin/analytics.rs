//! Platform-wide aggregates for the admin dashboard.

use actix_web::{web, HttpResponse};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::Db;
use crate::error::ApiError;

#[derive(Serialize)]
struct Overview {
    total_students: i64,
    total_recruiters: i64,
    total_internships: i64,
    total_applications: i64,
}

#[derive(Serialize)]
struct SkillPopularity {
    name: String,
    students: i64,
    average_score: f64,
}

#[derive(Serialize)]
struct StudentSummary {
    user_id: String,
    username: String,
    first_name: String,
    last_name: String,
    /// Sum of the profile's skill scores; the ranking key for top students.
    total_skill_score: i64,
}

#[derive(Serialize)]
struct Analytics {
    overview: Overview,
    applications_by_status: BTreeMap<String, i64>,
    top_skills: Vec<SkillPopularity>,
    recent_students: Vec<StudentSummary>,
    top_students: Vec<StudentSummary>,
}

pub(crate) async fn process(db: web::Data<Db>, user: AuthUser) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::Moderate)?;
    let conn = db.open()?;
    Ok(HttpResponse::Ok().json(analytics(&conn)?))
}

fn analytics(conn: &Connection) -> Result<Analytics, ApiError> {
    let overview = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM users WHERE role = 'student'),
                (SELECT COUNT(*) FROM users WHERE role = 'recruiter'),
                (SELECT COUNT(*) FROM internships),
                (SELECT COUNT(*) FROM applications)",
        [],
        |row| {
            Ok(Overview {
                total_students: row.get(0)?,
                total_recruiters: row.get(1)?,
                total_internships: row.get(2)?,
                total_applications: row.get(3)?,
            })
        },
    )?;

    let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM applications GROUP BY status")?;
    let applications_by_status = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

    let mut stmt = conn.prepare(
        "SELECT name, COUNT(*) AS students, AVG(score) FROM skills
         GROUP BY name ORDER BY students DESC, name LIMIT 10",
    )?;
    let top_skills = stmt
        .query_map([], |row| {
            Ok(SkillPopularity {
                name: row.get(0)?,
                students: row.get(1)?,
                average_score: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let student_summary = |row: &rusqlite::Row| -> rusqlite::Result<StudentSummary> {
        Ok(StudentSummary {
            user_id: row.get(0)?,
            username: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            total_skill_score: row.get(4)?,
        })
    };

    let mut stmt = conn.prepare(
        "SELECT u.id, u.username, p.first_name, p.last_name,
                COALESCE((SELECT SUM(score) FROM skills WHERE user_id = u.id), 0)
         FROM users u JOIN student_profiles p ON p.user_id = u.id
         ORDER BY u.created_at DESC LIMIT 5",
    )?;
    let recent_students = stmt
        .query_map([], student_summary)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT u.id, u.username, p.first_name, p.last_name,
                COALESCE((SELECT SUM(score) FROM skills WHERE user_id = u.id), 0) AS total
         FROM users u JOIN student_profiles p ON p.user_id = u.id
         ORDER BY total DESC LIMIT 5",
    )?;
    let top_students = stmt
        .query_map([], student_summary)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Analytics {
        overview,
        applications_by_status,
        top_skills,
        recent_students,
        top_students,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::services::applications::test_support::register_user;
    use common::model::user::Role;
    use rusqlite::params;

    #[test]
    fn top_students_rank_by_summed_skill_score() {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn).expect("schema");
        let alice = register_user(&conn, "alice", "alice@x.com", Role::Student);
        let bob = register_user(&conn, "bob", "bob@x.com", Role::Student);
        register_user(&conn, "rita", "rita@x.com", Role::Recruiter);

        for (user, name, score) in [
            (&alice, "Rust", 40),
            (&alice, "SQL", 30),
            (&bob, "Rust", 90),
        ] {
            conn.execute(
                "INSERT INTO skills (id, user_id, name, proficiency, score)
                 VALUES (?1, ?2, ?3, 'beginner', ?4)",
                params![uuid::Uuid::new_v4().to_string(), user, name, score],
            )
            .expect("skill");
        }

        let report = analytics(&conn).expect("analytics");
        assert_eq!(report.overview.total_students, 2);
        assert_eq!(report.overview.total_recruiters, 1);
        assert_eq!(report.top_students[0].username, "bob");
        assert_eq!(report.top_students[0].total_skill_score, 90);
        assert_eq!(report.top_skills[0].name, "Rust");
        assert_eq!(report.top_skills[0].students, 2);
        assert!((report.top_skills[0].average_score - 65.0).abs() < 1e-9);
    }
}
