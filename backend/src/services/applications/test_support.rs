//! Shared fixture for the application lifecycle tests: one student, one
//! recruiter and one open internship.

use chrono::{Duration, Utc};
use common::model::user::Role;
use common::requests::{ApplyRequest, RegisterRequest};
use rusqlite::{params, Connection};

use crate::db::{init_schema, ts};

pub(crate) struct Fixture {
    pub conn: Connection,
    pub student_id: String,
    pub recruiter_id: String,
    pub internship_id: String,
}

pub(crate) fn fixture() -> Fixture {
    let conn = Connection::open_in_memory().expect("open");
    init_schema(&conn).expect("schema");

    let student_id = register_user(&conn, "alice", "alice@x.com", Role::Student);
    let recruiter_id = register_user(&conn, "rita", "rita@x.com", Role::Recruiter);

    let now = Utc::now();
    conn.execute(
        "INSERT INTO internships (id, recruiter_id, title, company, description, location,
             work_type, duration, start_date, industry, application_deadline, openings,
             is_active, is_approved, posted_at)
         VALUES ('i1', ?1, 'Backend Intern', 'Acme', 'D', 'Remote', 'remote', '3 months',
             ?2, 'Tech', ?3, 2, 1, 1, ?2)",
        params![recruiter_id, ts(now), ts(now + Duration::days(30))],
    )
    .expect("internship");

    Fixture {
        conn,
        student_id,
        recruiter_id,
        internship_id: "i1".to_string(),
    }
}

pub(crate) fn register_user(conn: &Connection, username: &str, email: &str, role: Role) -> String {
    crate::services::auth::register::register(
        conn,
        &RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "Passw0rd".to_string(),
            role: Some(role),
            first_name: None,
            last_name: None,
        },
        24,
    )
    .expect("register")
    .user
    .id
}

pub(crate) fn empty_apply() -> ApplyRequest {
    ApplyRequest {
        cover_letter: None,
        resume: None,
    }
}
