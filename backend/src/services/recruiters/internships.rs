//! Posting management for the calling recruiter.
//!
//! Postings created here go live immediately; moderation is
//! post-publication, through the admin reject endpoint.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::internship::{ExperienceLevel, Internship};
use common::pagination::Paginated;
use common::requests::{CreateInternshipRequest, UpdateInternshipRequest};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Deserialize;

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{internship_from_row, INTERNSHIP_COLS};
use crate::db::{limit_offset, to_json, ts, Db};
use crate::error::ApiError;
use crate::validation::{validate_internship, validate_internship_update};

pub(crate) async fn create_process(
    db: web::Data<Db>,
    user: AuthUser,
    payload: web::Json<CreateInternshipRequest>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManagePostings)?;
    let conn = db.open()?;
    let internship = create_internship(&conn, &user.id, &payload)?;
    Ok(HttpResponse::Created().json(internship))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    /// One of `active`, `inactive`, `pending`, `approved`.
    status: Option<String>,
    search: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

pub(crate) async fn list_process(
    db: web::Data<Db>,
    user: AuthUser,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManagePostings)?;
    let conn = db.open()?;
    let (page, limit) = common::pagination::clamp(query.page, query.limit);

    let mut where_sql = "recruiter_id = ?".to_string();
    let mut filters: Vec<Value> = vec![Value::Text(user.id.clone())];
    match query.status.as_deref() {
        Some("active") => where_sql.push_str(" AND is_active = 1"),
        Some("inactive") => where_sql.push_str(" AND is_active = 0"),
        Some("pending") => where_sql.push_str(" AND is_approved = 0"),
        Some("approved") => where_sql.push_str(" AND is_approved = 1"),
        _ => {}
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND (title LIKE ? OR company LIKE ?)");
        let like = format!("%{}%", search);
        filters.push(Value::Text(like.clone()));
        filters.push(Value::Text(like));
    }

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM internships WHERE {}", where_sql),
        params_from_iter(filters.iter()),
        |row| row.get(0),
    )?;

    let (lim, offset) = limit_offset(page, limit);
    filters.push(Value::Integer(lim));
    filters.push(Value::Integer(offset));
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM internships WHERE {} ORDER BY posted_at DESC LIMIT ? OFFSET ?",
        INTERNSHIP_COLS, where_sql
    ))?;
    let items = stmt
        .query_map(params_from_iter(filters.iter()), internship_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(Paginated::new(items, page, limit, total)))
}

pub(crate) async fn update_process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
    payload: web::Json<UpdateInternshipRequest>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManagePostings)?;
    let conn = db.open()?;
    let internship = update_internship(&conn, &user.id, &path, &payload)?;
    Ok(HttpResponse::Ok().json(internship))
}

pub(crate) async fn delete_process(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManagePostings)?;
    let conn = db.open()?;
    delete_internship(&conn, &user.id, &path)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Internship deleted" })))
}

pub(crate) fn create_internship(
    conn: &Connection,
    recruiter_id: &str,
    req: &CreateInternshipRequest,
) -> Result<Internship, ApiError> {
    validate_internship(req)?;

    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();
    let level = req.experience_level.unwrap_or(ExperienceLevel::EntryLevel);
    let (stipend_min, stipend_max, stipend_currency) = match &req.stipend_range {
        Some(range) => (range.min, range.max, Some(range.currency.clone())),
        None => (None, None, None),
    };

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO internships (id, recruiter_id, title, company, description, requirements,
             responsibilities, skills, location, work_type, duration, start_date, end_date,
             stipend, stipend_min, stipend_max, stipend_currency, is_paid, industry,
             application_deadline, openings, experience_level, tags, company_logo,
             company_website, is_active, is_approved, posted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
             ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, 1, 1, ?26)",
        params![
            id,
            recruiter_id,
            req.title.trim(),
            req.company.trim(),
            req.description.trim(),
            to_json(&req.requirements)?,
            to_json(&req.responsibilities)?,
            to_json(&req.skills)?,
            req.location.trim(),
            req.work_type.as_str(),
            req.duration.trim(),
            ts(req.start_date),
            req.end_date.map(ts),
            req.stipend,
            stipend_min,
            stipend_max,
            stipend_currency,
            req.is_paid,
            req.industry.trim(),
            ts(req.application_deadline),
            req.openings,
            level.as_str(),
            to_json(&req.tags)?,
            req.company_logo,
            req.company_website,
            ts(now),
        ],
    )?;
    tx.execute(
        "UPDATE recruiter_profiles SET internships_posted = internships_posted + 1
         WHERE user_id = ?1",
        params![recruiter_id],
    )?;

    let internship = tx.query_row(
        &format!("SELECT {} FROM internships WHERE id = ?1", INTERNSHIP_COLS),
        params![id],
        internship_from_row,
    )?;
    tx.commit()?;
    Ok(internship)
}

pub(crate) fn update_internship(
    conn: &Connection,
    recruiter_id: &str,
    internship_id: &str,
    req: &UpdateInternshipRequest,
) -> Result<Internship, ApiError> {
    validate_internship_update(req)?;

    let mut sets: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    let mut set = |sets: &mut Vec<String>, values: &mut Vec<Value>, column: &str, value: Value| {
        sets.push(format!("{} = ?{}", column, values.len() + 1));
        values.push(value);
    };

    if let Some(v) = &req.title {
        set(&mut sets, &mut values, "title", Value::Text(v.trim().to_string()));
    }
    if let Some(v) = &req.company {
        set(&mut sets, &mut values, "company", Value::Text(v.trim().to_string()));
    }
    if let Some(v) = &req.description {
        set(&mut sets, &mut values, "description", Value::Text(v.trim().to_string()));
    }
    if let Some(v) = &req.requirements {
        set(&mut sets, &mut values, "requirements", Value::Text(to_json(v)?));
    }
    if let Some(v) = &req.responsibilities {
        set(&mut sets, &mut values, "responsibilities", Value::Text(to_json(v)?));
    }
    if let Some(v) = &req.skills {
        set(&mut sets, &mut values, "skills", Value::Text(to_json(v)?));
    }
    if let Some(v) = &req.location {
        set(&mut sets, &mut values, "location", Value::Text(v.trim().to_string()));
    }
    if let Some(v) = req.work_type {
        set(&mut sets, &mut values, "work_type", Value::Text(v.as_str().to_string()));
    }
    if let Some(v) = &req.duration {
        set(&mut sets, &mut values, "duration", Value::Text(v.trim().to_string()));
    }
    if let Some(v) = req.start_date {
        set(&mut sets, &mut values, "start_date", Value::Text(ts(v)));
    }
    if let Some(v) = req.end_date {
        set(&mut sets, &mut values, "end_date", Value::Text(ts(v)));
    }
    if let Some(v) = &req.stipend {
        set(&mut sets, &mut values, "stipend", Value::Text(v.clone()));
    }
    if let Some(range) = &req.stipend_range {
        set(
            &mut sets,
            &mut values,
            "stipend_min",
            range.min.map_or(Value::Null, Value::Integer),
        );
        set(
            &mut sets,
            &mut values,
            "stipend_max",
            range.max.map_or(Value::Null, Value::Integer),
        );
        set(
            &mut sets,
            &mut values,
            "stipend_currency",
            Value::Text(range.currency.clone()),
        );
    }
    if let Some(v) = req.is_paid {
        set(&mut sets, &mut values, "is_paid", Value::Integer(i64::from(v)));
    }
    if let Some(v) = &req.industry {
        set(&mut sets, &mut values, "industry", Value::Text(v.trim().to_string()));
    }
    if let Some(v) = req.application_deadline {
        set(&mut sets, &mut values, "application_deadline", Value::Text(ts(v)));
    }
    if let Some(v) = req.openings {
        set(&mut sets, &mut values, "openings", Value::Integer(i64::from(v)));
    }
    if let Some(v) = req.experience_level {
        set(
            &mut sets,
            &mut values,
            "experience_level",
            Value::Text(v.as_str().to_string()),
        );
    }
    if let Some(v) = &req.tags {
        set(&mut sets, &mut values, "tags", Value::Text(to_json(v)?));
    }
    if let Some(v) = &req.company_logo {
        set(&mut sets, &mut values, "company_logo", Value::Text(v.clone()));
    }
    if let Some(v) = &req.company_website {
        set(&mut sets, &mut values, "company_website", Value::Text(v.clone()));
    }
    if let Some(v) = req.is_active {
        set(&mut sets, &mut values, "is_active", Value::Integer(i64::from(v)));
    }

    if !sets.is_empty() {
        values.push(Value::Text(internship_id.to_string()));
        values.push(Value::Text(recruiter_id.to_string()));
        let updated = conn.execute(
            &format!(
                "UPDATE internships SET {} WHERE id = ?{} AND recruiter_id = ?{}",
                sets.join(", "),
                values.len() - 1,
                values.len()
            ),
            params_from_iter(values.iter()),
        )?;
        if updated == 0 {
            return Err(ApiError::NotFound("Internship not found".to_string()));
        }
    }

    conn.query_row(
        &format!(
            "SELECT {} FROM internships WHERE id = ?1 AND recruiter_id = ?2",
            INTERNSHIP_COLS
        ),
        params![internship_id, recruiter_id],
        internship_from_row,
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound("Internship not found".to_string()))
}

/// Deletes a posting with everything hanging off it, in one transaction:
/// note threads first, then applications, then the posting itself.
pub(crate) fn delete_internship(
    conn: &Connection,
    recruiter_id: &str,
    internship_id: &str,
) -> Result<(), ApiError> {
    let tx = conn.unchecked_transaction()?;

    let owned: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM internships WHERE id = ?1 AND recruiter_id = ?2",
            params![internship_id, recruiter_id],
            |row| row.get(0),
        )
        .optional()?;
    if owned.is_none() {
        return Err(ApiError::NotFound("Internship not found".to_string()));
    }

    tx.execute(
        "DELETE FROM application_notes WHERE application_id IN
             (SELECT id FROM applications WHERE internship_id = ?1)",
        params![internship_id],
    )?;
    tx.execute(
        "DELETE FROM applications WHERE internship_id = ?1",
        params![internship_id],
    )?;
    tx.execute(
        "DELETE FROM internships WHERE id = ?1",
        params![internship_id],
    )?;

    tx.commit()?;
    Ok(())
}
