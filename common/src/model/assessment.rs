//! Historical record of one completed skill quiz attempt.
//!
//! Assessments are append-only: once recorded they are never mutated. The
//! attempt number counts prior attempts by the same student for the same
//! skill.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::profile::Proficiency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentAnswer {
    pub question_index: usize,
    pub selected_answer: usize,
    pub is_correct: bool,
    /// Seconds spent on this question.
    pub time_spent: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillAssessment {
    pub id: String,
    pub student_id: String,
    pub skill: String,
    pub questions: Vec<AssessmentQuestion>,
    pub answers: Vec<AssessmentAnswer>,
    /// Aggregate score 0-100.
    pub score: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    /// Total seconds taken.
    pub time_taken: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub proficiency_level: Proficiency,
    pub attempt_number: u32,
}
