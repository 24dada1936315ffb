//! Skill quiz grading and attempt history.
//!
//! A submission is graded server-side against the question set it carries,
//! recorded append-only, and folded back into the matching profile skill in
//! one transaction.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::assessment::{AssessmentAnswer, SkillAssessment};
use common::model::profile::Proficiency;
use common::requests::SubmitAssessmentRequest;
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::policy::{authorize, Action};
use crate::auth::AuthUser;
use crate::db::map::{assessment_from_row, ASSESSMENT_COLS};
use crate::db::{to_json, ts, Db};
use crate::error::ApiError;

pub(crate) async fn list_process(
    db: web::Data<Db>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManageStudentProfile)?;
    let conn = db.open()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM skill_assessments WHERE student_id = ?1 ORDER BY completed_at DESC",
        ASSESSMENT_COLS
    ))?;
    let attempts = stmt
        .query_map(params![user.id], assessment_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(HttpResponse::Ok().json(attempts))
}

pub(crate) async fn submit_process(
    db: web::Data<Db>,
    user: AuthUser,
    payload: web::Json<SubmitAssessmentRequest>,
) -> Result<HttpResponse, ApiError> {
    authorize(&user, Action::ManageStudentProfile)?;
    let conn = db.open()?;
    let attempt = submit_assessment(&conn, &user.id, &payload)?;
    Ok(HttpResponse::Created().json(attempt))
}

pub(crate) fn submit_assessment(
    conn: &Connection,
    student_id: &str,
    req: &SubmitAssessmentRequest,
) -> Result<SkillAssessment, ApiError> {
    let skill = req.skill.trim();
    if skill.is_empty() || req.questions.is_empty() {
        return Err(ApiError::BadRequest(
            "Skill and questions are required".to_string(),
        ));
    }

    let mut answers: Vec<AssessmentAnswer> = Vec::with_capacity(req.answers.len());
    let mut correct = 0u32;
    let mut time_taken = 0u32;
    for answer in &req.answers {
        let question = req.questions.get(answer.question_index).ok_or_else(|| {
            ApiError::BadRequest("Answer refers to an unknown question".to_string())
        })?;
        let is_correct = answer.selected_answer == question.correct_answer;
        if is_correct {
            correct += 1;
        }
        time_taken += answer.time_spent;
        answers.push(AssessmentAnswer {
            question_index: answer.question_index,
            selected_answer: answer.selected_answer,
            is_correct,
            time_spent: answer.time_spent,
        });
    }

    let total = req.questions.len() as u32;
    let score = ((f64::from(correct) / f64::from(total)) * 100.0).round() as u32;
    let proficiency = Proficiency::from_score(score);

    let tx = conn.unchecked_transaction()?;

    let attempt_number: u32 = tx.query_row(
        "SELECT COUNT(*) + 1 FROM skill_assessments WHERE student_id = ?1 AND skill = ?2",
        params![student_id, skill],
        |row| row.get::<_, i64>(0).map(|n| n.max(1) as u32),
    )?;

    let id = uuid::Uuid::new_v4().to_string();
    tx.execute(
        "INSERT INTO skill_assessments (id, student_id, skill, questions, answers, score,
             total_questions, correct_answers, time_taken, started_at, completed_at,
             proficiency_level, attempt_number)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            id,
            student_id,
            skill,
            to_json(&req.questions)?,
            to_json(&answers)?,
            score,
            total,
            correct,
            time_taken,
            ts(req.started_at),
            ts(req.completed_at),
            proficiency.as_str(),
            attempt_number,
        ],
    )?;

    // fold the result back into the profile skill, counting it as assessed
    // the first time it gets a result
    let now = ts(Utc::now());
    let existing: Option<(String, Option<String>)> = tx
        .query_row(
            "SELECT id, last_assessed FROM skills WHERE user_id = ?1 AND name = ?2",
            params![student_id, skill],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    match existing {
        Some((skill_id, last_assessed)) => {
            tx.execute(
                "UPDATE skills SET score = ?1, proficiency = ?2, last_assessed = ?3 WHERE id = ?4",
                params![score, proficiency.as_str(), now, skill_id],
            )?;
            if last_assessed.is_none() {
                tx.execute(
                    "UPDATE student_profiles SET skills_assessed_count = skills_assessed_count + 1
                     WHERE user_id = ?1",
                    params![student_id],
                )?;
            }
        }
        None => {
            tx.execute(
                "INSERT INTO skills (id, user_id, name, proficiency, score, last_assessed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    uuid::Uuid::new_v4().to_string(),
                    student_id,
                    skill,
                    proficiency.as_str(),
                    score,
                    now
                ],
            )?;
            tx.execute(
                "UPDATE student_profiles SET skills_assessed_count = skills_assessed_count + 1
                 WHERE user_id = ?1",
                params![student_id],
            )?;
        }
    }

    let attempt = tx.query_row(
        &format!(
            "SELECT {} FROM skill_assessments WHERE id = ?1",
            ASSESSMENT_COLS
        ),
        params![id],
        assessment_from_row,
    )?;
    tx.commit()?;
    Ok(attempt)
}
