//! Per-role profile records, one-to-one with their owning user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::application::ResumeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Proficiency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Proficiency::Beginner => "beginner",
            Proficiency::Intermediate => "intermediate",
            Proficiency::Advanced => "advanced",
            Proficiency::Expert => "expert",
        }
    }

    pub fn parse(s: &str) -> Option<Proficiency> {
        match s {
            "beginner" => Some(Proficiency::Beginner),
            "intermediate" => Some(Proficiency::Intermediate),
            "advanced" => Some(Proficiency::Advanced),
            "expert" => Some(Proficiency::Expert),
            _ => None,
        }
    }

    /// Level derived from an assessment score.
    pub fn from_score(score: u32) -> Proficiency {
        match score {
            0..=39 => Proficiency::Beginner,
            40..=64 => Proficiency::Intermediate,
            65..=84 => Proficiency::Advanced,
            _ => Proficiency::Expert,
        }
    }
}

/// One skill on a student profile. The name is unique within the profile,
/// compared case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub proficiency: Proficiency,
    pub score: u32,
    pub last_assessed: Option<DateTime<Utc>>,
    pub endorsements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub current: bool,
    pub gpa: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub company: String,
    pub position: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub job_types: Vec<String>,
    pub locations: Vec<String>,
    pub industries: Vec<String>,
}

/// Denormalized counters kept alongside related writes elsewhere. Each bump
/// is a single-statement increment inside the transaction of the operation
/// that caused it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StudentStats {
    pub applications_count: i64,
    pub shortlisted_count: i64,
    pub selected_count: i64,
    pub skills_assessed_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub resume: Option<ResumeRef>,
    pub skills: Vec<Skill>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub portfolio: Vec<PortfolioItem>,
    pub social_links: SocialLinks,
    pub preferences: Preferences,
    pub stats: StudentStats,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RecruiterStats {
    pub internships_posted: i64,
    pub applications_received: i64,
    pub candidates_hired: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecruiterProfile {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub position: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub company_logo: Option<String>,
    pub company_website: Option<String>,
    pub company_size: Option<String>,
    pub industry: String,
    pub social_links: SocialLinks,
    /// Set only by an admin; never flipped by the recruiter itself.
    pub is_verified: bool,
    pub stats: RecruiterStats,
}
