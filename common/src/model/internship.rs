use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkType {
    Onsite,
    Remote,
    Hybrid,
}

impl WorkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::Onsite => "onsite",
            WorkType::Remote => "remote",
            WorkType::Hybrid => "hybrid",
        }
    }

    pub fn parse(s: &str) -> Option<WorkType> {
        match s {
            "onsite" => Some(WorkType::Onsite),
            "remote" => Some(WorkType::Remote),
            "hybrid" => Some(WorkType::Hybrid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    #[serde(rename = "entry-level")]
    EntryLevel,
    #[serde(rename = "intermediate")]
    Intermediate,
    #[serde(rename = "advanced")]
    Advanced,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::EntryLevel => "entry-level",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }

    pub fn parse(s: &str) -> Option<ExperienceLevel> {
        match s {
            "entry-level" => Some(ExperienceLevel::EntryLevel),
            "intermediate" => Some(ExperienceLevel::Intermediate),
            "advanced" => Some(ExperienceLevel::Advanced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StipendRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub currency: String,
}

/// A recruiter-authored posting. Publicly visible only while it is active,
/// approved and its deadline has not passed; see [`Internship::is_public`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Internship {
    pub id: String,
    pub recruiter_id: String,
    pub title: String,
    pub company: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub responsibilities: Vec<String>,
    pub skills: Vec<String>,
    pub location: String,
    pub work_type: WorkType,
    pub duration: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub stipend: Option<String>,
    pub stipend_range: Option<StipendRange>,
    pub is_paid: bool,
    pub industry: String,
    pub application_deadline: DateTime<Utc>,
    pub openings: u32,
    pub experience_level: ExperienceLevel,
    pub tags: Vec<String>,
    pub company_logo: Option<String>,
    pub company_website: Option<String>,
    pub is_active: bool,
    pub is_approved: bool,
    pub rejection_reason: Option<String>,
    pub posted_at: DateTime<Utc>,
    pub views: i64,
    pub applications_count: i64,
}

impl Internship {
    /// The visibility rule applied by every public listing, search and
    /// detail operation, and by the apply precondition.
    pub fn is_public(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.is_approved && self.application_deadline > now
    }
}
