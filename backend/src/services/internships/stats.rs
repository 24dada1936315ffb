use actix_web::{web, HttpResponse};
use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::db::{ts, Db};
use crate::error::ApiError;

#[derive(Serialize)]
struct BucketCount {
    name: String,
    count: i64,
}

#[derive(Serialize)]
struct CatalogStats {
    total_internships: i64,
    total_openings: i64,
    total_companies: i64,
    top_industries: Vec<BucketCount>,
    top_locations: Vec<BucketCount>,
}

pub(crate) async fn process(db: web::Data<Db>) -> Result<HttpResponse, ApiError> {
    let conn = db.open()?;
    Ok(HttpResponse::Ok().json(catalog_stats(&conn)?))
}

fn catalog_stats(conn: &Connection) -> Result<CatalogStats, ApiError> {
    let now = ts(Utc::now());
    let visible = "is_active = 1 AND is_approved = 1 AND application_deadline > ?1";

    let (total_internships, total_openings, total_companies) = conn.query_row(
        &format!(
            "SELECT COUNT(*), COALESCE(SUM(openings), 0), COUNT(DISTINCT company)
             FROM internships WHERE {}",
            visible
        ),
        params![now],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    let top = |column: &str| -> Result<Vec<BucketCount>, ApiError> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {col}, COUNT(*) AS n FROM internships WHERE {visible}
             GROUP BY {col} ORDER BY n DESC LIMIT 10",
            col = column,
            visible = visible
        ))?;
        let rows = stmt
            .query_map(params![now], |row| {
                Ok(BucketCount {
                    name: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    };

    Ok(CatalogStats {
        total_internships,
        total_openings,
        total_companies,
        top_industries: top("industry")?,
        top_locations: top("location")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use chrono::Duration;

    fn insert_internship(conn: &Connection, id: &str, industry: &str, location: &str, openings: u32) {
        let now = Utc::now();
        conn.execute(
            "INSERT INTO internships (id, recruiter_id, title, company, description, location,
                 work_type, duration, start_date, industry, application_deadline, openings,
                 is_active, is_approved, posted_at)
             VALUES (?1, 'r1', 'T', 'Acme', 'D', ?2, 'remote', '3 months', ?3, ?4, ?5, ?6, 1, 1, ?3)",
            params![
                id,
                location,
                ts(now),
                industry,
                ts(now + Duration::days(30)),
                openings
            ],
        )
        .expect("insert");
    }

    #[test]
    fn aggregates_only_visible_postings() {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn).expect("schema");
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, role, created_at)
             VALUES ('r1', 'rita', 'rita@x.com', 'h', 'recruiter', ?1)",
            params![ts(Utc::now())],
        )
        .expect("user");
        insert_internship(&conn, "i1", "Tech", "Remote", 2);
        insert_internship(&conn, "i2", "Tech", "Berlin", 1);
        insert_internship(&conn, "i3", "Finance", "Berlin", 3);
        // expired posting is excluded
        insert_internship(&conn, "i4", "Tech", "Remote", 9);
        conn.execute(
            "UPDATE internships SET application_deadline = ?1 WHERE id = 'i4'",
            params![ts(Utc::now() - Duration::days(1))],
        )
        .expect("expire");

        let stats = catalog_stats(&conn).expect("stats");
        assert_eq!(stats.total_internships, 3);
        assert_eq!(stats.total_openings, 6);
        assert_eq!(stats.top_industries[0].name, "Tech");
        assert_eq!(stats.top_industries[0].count, 2);
        assert_eq!(stats.top_locations[0].name, "Berlin");
    }
}
