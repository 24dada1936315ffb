//! Row-to-model mapping shared by the service modules.
//!
//! Each mapper pairs with a `*_COLS` column list so every SELECT pulls the
//! columns in the shape the mapper expects.

use common::model::application::{
    Application, ApplicationStatus, Feedback, InterviewSchedule, InterviewType, ResumeRef,
};
use common::model::assessment::SkillAssessment;
use common::model::internship::{ExperienceLevel, Internship, StipendRange, WorkType};
use common::model::profile::{
    Proficiency, RecruiterProfile, RecruiterStats, Skill, StudentProfile, StudentStats,
};
use common::model::user::{Role, User};
use rusqlite::types::Type;
use rusqlite::Row;

use super::{from_json, parse_opt_ts, parse_ts};

fn bad_enum(what: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        Type::Text,
        format!("unknown {} value: {}", what, value).into(),
    )
}

pub const USER_COLS: &str = "id, username, email, role, is_active, last_login, created_at";

pub fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    let role_s: String = row.get("role")?;
    let role = Role::parse(&role_s).ok_or_else(|| bad_enum("role", &role_s))?;
    let last_login: Option<String> = row.get("last_login")?;
    let created_at: String = row.get("created_at")?;
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        role,
        is_active: row.get("is_active")?,
        last_login: parse_opt_ts(last_login)?,
        created_at: parse_ts(&created_at)?,
    })
}

pub const INTERNSHIP_COLS: &str = "id, recruiter_id, title, company, description, requirements, \
     responsibilities, skills, location, work_type, duration, start_date, end_date, stipend, \
     stipend_min, stipend_max, stipend_currency, is_paid, industry, application_deadline, \
     openings, experience_level, tags, company_logo, company_website, is_active, is_approved, \
     rejection_reason, posted_at, views, applications_count";

pub fn internship_from_row(row: &Row) -> rusqlite::Result<Internship> {
    let work_type_s: String = row.get("work_type")?;
    let work_type =
        WorkType::parse(&work_type_s).ok_or_else(|| bad_enum("work_type", &work_type_s))?;
    let level_s: String = row.get("experience_level")?;
    let experience_level =
        ExperienceLevel::parse(&level_s).ok_or_else(|| bad_enum("experience_level", &level_s))?;

    let requirements: String = row.get("requirements")?;
    let responsibilities: String = row.get("responsibilities")?;
    let skills: String = row.get("skills")?;
    let tags: String = row.get("tags")?;

    let stipend_min: Option<i64> = row.get("stipend_min")?;
    let stipend_max: Option<i64> = row.get("stipend_max")?;
    let stipend_currency: Option<String> = row.get("stipend_currency")?;
    let stipend_range = if stipend_min.is_none() && stipend_max.is_none() {
        None
    } else {
        Some(StipendRange {
            min: stipend_min,
            max: stipend_max,
            currency: stipend_currency.unwrap_or_else(|| "USD".to_string()),
        })
    };

    let start_date: String = row.get("start_date")?;
    let end_date: Option<String> = row.get("end_date")?;
    let deadline: String = row.get("application_deadline")?;
    let posted_at: String = row.get("posted_at")?;

    Ok(Internship {
        id: row.get("id")?,
        recruiter_id: row.get("recruiter_id")?,
        title: row.get("title")?,
        company: row.get("company")?,
        description: row.get("description")?,
        requirements: from_json(&requirements)?,
        responsibilities: from_json(&responsibilities)?,
        skills: from_json(&skills)?,
        location: row.get("location")?,
        work_type,
        duration: row.get("duration")?,
        start_date: parse_ts(&start_date)?,
        end_date: parse_opt_ts(end_date)?,
        stipend: row.get("stipend")?,
        stipend_range,
        is_paid: row.get("is_paid")?,
        industry: row.get("industry")?,
        application_deadline: parse_ts(&deadline)?,
        openings: row.get("openings")?,
        experience_level,
        tags: from_json(&tags)?,
        company_logo: row.get("company_logo")?,
        company_website: row.get("company_website")?,
        is_active: row.get("is_active")?,
        is_approved: row.get("is_approved")?,
        rejection_reason: row.get("rejection_reason")?,
        posted_at: parse_ts(&posted_at)?,
        views: row.get("views")?,
        applications_count: row.get("applications_count")?,
    })
}

pub const APPLICATION_COLS: &str = "id, student_id, internship_id, recruiter_id, status, \
     cover_letter, resume_url, resume_filename, applied_at, last_updated, interview_date, \
     interview_time, interview_location, interview_type, interview_notes, feedback_rating, \
     feedback_comments, feedback_by, feedback_at";

/// Maps an application row. Notes live in their own table and are attached
/// by the caller when the endpoint includes them.
pub fn application_from_row(row: &Row) -> rusqlite::Result<Application> {
    let status_s: String = row.get("status")?;
    let status =
        ApplicationStatus::parse(&status_s).ok_or_else(|| bad_enum("status", &status_s))?;

    let resume_url: Option<String> = row.get("resume_url")?;
    let resume_filename: Option<String> = row.get("resume_filename")?;
    let resume = match (resume_url, resume_filename) {
        (Some(url), Some(filename)) => Some(ResumeRef { url, filename }),
        (Some(url), None) => Some(ResumeRef {
            url,
            filename: String::new(),
        }),
        _ => None,
    };

    let interview_date: Option<String> = row.get("interview_date")?;
    let interview_schedule = match interview_date {
        Some(date) => {
            let type_s: Option<String> = row.get("interview_type")?;
            let interview_type = type_s
                .as_deref()
                .and_then(InterviewType::parse)
                .unwrap_or(InterviewType::Video);
            Some(InterviewSchedule {
                date: parse_ts(&date)?,
                time: row.get::<_, Option<String>>("interview_time")?.unwrap_or_default(),
                location: row.get("interview_location")?,
                interview_type,
                notes: row.get("interview_notes")?,
            })
        }
        None => None,
    };

    let feedback_rating: Option<i64> = row.get("feedback_rating")?;
    let feedback = match feedback_rating {
        Some(rating) => {
            let given_at: Option<String> = row.get("feedback_at")?;
            Some(Feedback {
                rating: rating.clamp(1, 5) as u8,
                comments: row.get("feedback_comments")?,
                given_by: row.get::<_, Option<String>>("feedback_by")?.unwrap_or_default(),
                given_at: parse_opt_ts(given_at)?.unwrap_or_else(chrono::Utc::now),
            })
        }
        None => None,
    };

    let applied_at: String = row.get("applied_at")?;
    let last_updated: String = row.get("last_updated")?;

    Ok(Application {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        internship_id: row.get("internship_id")?,
        recruiter_id: row.get("recruiter_id")?,
        status,
        cover_letter: row.get("cover_letter")?,
        resume,
        applied_at: parse_ts(&applied_at)?,
        last_updated: parse_ts(&last_updated)?,
        notes: Vec::new(),
        interview_schedule,
        feedback,
    })
}

pub const SKILL_COLS: &str = "id, name, proficiency, score, last_assessed";

/// Maps a skill row. Endorsements are attached by the caller where the
/// endpoint includes them.
pub fn skill_from_row(row: &Row) -> rusqlite::Result<Skill> {
    let prof_s: String = row.get("proficiency")?;
    let proficiency =
        Proficiency::parse(&prof_s).ok_or_else(|| bad_enum("proficiency", &prof_s))?;
    let last_assessed: Option<String> = row.get("last_assessed")?;
    let score: i64 = row.get("score")?;
    Ok(Skill {
        id: row.get("id")?,
        name: row.get("name")?,
        proficiency,
        score: score.clamp(0, 100) as u32,
        last_assessed: parse_opt_ts(last_assessed)?,
        endorsements: Vec::new(),
    })
}

pub const STUDENT_PROFILE_COLS: &str = "user_id, first_name, last_name, phone, location, bio, \
     avatar, resume_url, resume_filename, education, experience, portfolio, social_links, \
     preferences, applications_count, shortlisted_count, selected_count, skills_assessed_count";

/// Maps a student profile row. Skills are attached by the caller.
pub fn student_profile_from_row(row: &Row) -> rusqlite::Result<StudentProfile> {
    let resume_url: Option<String> = row.get("resume_url")?;
    let resume_filename: Option<String> = row.get("resume_filename")?;
    let resume = match (resume_url, resume_filename) {
        (Some(url), filename) => Some(ResumeRef {
            url,
            filename: filename.unwrap_or_default(),
        }),
        _ => None,
    };

    let education: String = row.get("education")?;
    let experience: String = row.get("experience")?;
    let portfolio: String = row.get("portfolio")?;
    let social_links: String = row.get("social_links")?;
    let preferences: String = row.get("preferences")?;

    Ok(StudentProfile {
        user_id: row.get("user_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        phone: row.get("phone")?,
        location: row.get("location")?,
        bio: row.get("bio")?,
        avatar: row.get("avatar")?,
        resume,
        skills: Vec::new(),
        education: from_json(&education)?,
        experience: from_json(&experience)?,
        portfolio: from_json(&portfolio)?,
        social_links: from_json(&social_links)?,
        preferences: from_json(&preferences)?,
        stats: StudentStats {
            applications_count: row.get("applications_count")?,
            shortlisted_count: row.get("shortlisted_count")?,
            selected_count: row.get("selected_count")?,
            skills_assessed_count: row.get("skills_assessed_count")?,
        },
    })
}

pub const RECRUITER_PROFILE_COLS: &str = "user_id, first_name, last_name, company, position, \
     phone, location, bio, avatar, company_logo, company_website, company_size, industry, \
     social_links, is_verified, internships_posted, applications_received, candidates_hired";

pub fn recruiter_profile_from_row(row: &Row) -> rusqlite::Result<RecruiterProfile> {
    let social_links: String = row.get("social_links")?;
    Ok(RecruiterProfile {
        user_id: row.get("user_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        company: row.get("company")?,
        position: row.get("position")?,
        phone: row.get("phone")?,
        location: row.get("location")?,
        bio: row.get("bio")?,
        avatar: row.get("avatar")?,
        company_logo: row.get("company_logo")?,
        company_website: row.get("company_website")?,
        company_size: row.get("company_size")?,
        industry: row.get("industry")?,
        social_links: from_json(&social_links)?,
        is_verified: row.get("is_verified")?,
        stats: RecruiterStats {
            internships_posted: row.get("internships_posted")?,
            applications_received: row.get("applications_received")?,
            candidates_hired: row.get("candidates_hired")?,
        },
    })
}

pub const ASSESSMENT_COLS: &str = "id, student_id, skill, questions, answers, score, \
     total_questions, correct_answers, time_taken, started_at, completed_at, proficiency_level, \
     attempt_number";

pub fn assessment_from_row(row: &Row) -> rusqlite::Result<SkillAssessment> {
    let prof_s: String = row.get("proficiency_level")?;
    let proficiency_level =
        Proficiency::parse(&prof_s).ok_or_else(|| bad_enum("proficiency", &prof_s))?;
    let questions: String = row.get("questions")?;
    let answers: String = row.get("answers")?;
    let started_at: String = row.get("started_at")?;
    let completed_at: String = row.get("completed_at")?;
    let score: i64 = row.get("score")?;
    let total_questions: i64 = row.get("total_questions")?;
    let correct_answers: i64 = row.get("correct_answers")?;
    let time_taken: i64 = row.get("time_taken")?;
    let attempt_number: i64 = row.get("attempt_number")?;

    Ok(SkillAssessment {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        skill: row.get("skill")?,
        questions: from_json(&questions)?,
        answers: from_json(&answers)?,
        score: score.max(0) as u32,
        total_questions: total_questions.max(0) as u32,
        correct_answers: correct_answers.max(0) as u32,
        time_taken: time_taken.max(0) as u32,
        started_at: parse_ts(&started_at)?,
        completed_at: parse_ts(&completed_at)?,
        proficiency_level,
        attempt_number: attempt_number.max(1) as u32,
    })
}
