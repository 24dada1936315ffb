//! Request payloads shared between clients and the backend.
//!
//! Endpoint-specific query structs stay next to their handlers; the payloads
//! here are the ones that describe domain mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::application::{ApplicationStatus, InterviewType, ResumeRef};
use crate::model::internship::{ExperienceLevel, StipendRange, WorkType};
use crate::model::profile::{
    Education, Experience, PortfolioItem, Preferences, Proficiency, SocialLinks,
};
use crate::model::user::{Role, User};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Returned by register and login: the bearer credential plus the identity
/// it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyRequest {
    pub cover_letter: Option<String>,
    pub resume: Option<ResumeRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ApplicationStatus,
    /// Optional note appended alongside the status change.
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleInterviewRequest {
    pub date: DateTime<Utc>,
    pub time: String,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteRequest {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub rating: u8,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateApplicationRequest {
    pub notes: Option<String>,
    pub feedback: Option<FeedbackRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddSkillRequest {
    pub name: String,
    pub proficiency: Option<Proficiency>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSkillRequest {
    pub proficiency: Option<Proficiency>,
    pub score: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedAnswer {
    pub question_index: usize,
    pub selected_answer: usize,
    #[serde(default)]
    pub time_spent: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAssessmentRequest {
    pub skill: String,
    pub questions: Vec<crate::model::assessment::AssessmentQuestion>,
    pub answers: Vec<SubmittedAnswer>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInternshipRequest {
    pub title: String,
    pub company: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub location: String,
    pub work_type: WorkType,
    pub duration: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub stipend: Option<String>,
    pub stipend_range: Option<StipendRange>,
    #[serde(default)]
    pub is_paid: bool,
    pub industry: String,
    pub application_deadline: DateTime<Utc>,
    pub openings: u32,
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub company_logo: Option<String>,
    pub company_website: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInternshipRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub responsibilities: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub location: Option<String>,
    pub work_type: Option<WorkType>,
    pub duration: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub stipend: Option<String>,
    pub stipend_range: Option<StipendRange>,
    pub is_paid: Option<bool>,
    pub industry: Option<String>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub openings: Option<u32>,
    pub experience_level: Option<ExperienceLevel>,
    pub tags: Option<Vec<String>>,
    pub company_logo: Option<String>,
    pub company_website: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStudentProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub resume: Option<ResumeRef>,
    pub education: Option<Vec<Education>>,
    pub experience: Option<Vec<Experience>>,
    pub portfolio: Option<Vec<PortfolioItem>>,
    pub social_links: Option<SocialLinks>,
    pub preferences: Option<Preferences>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRecruiterProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub company_logo: Option<String>,
    pub company_website: Option<String>,
    pub company_size: Option<String>,
    pub industry: Option<String>,
    pub social_links: Option<SocialLinks>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RejectInternshipRequest {
    pub reason: String,
}
