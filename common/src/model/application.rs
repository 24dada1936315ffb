//! The application lifecycle: one student's attempt at one internship.
//!
//! The status state machine lives here as a tagged enum with an explicit
//! transition function. Handlers never compare raw status strings; every
//! lifecycle move goes through [`ApplicationStatus::can_transition`], so an
//! illegal move (withdrawing a selected application, re-selecting an already
//! selected one) is rejected in exactly one place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states of an [`Application`].
///
/// `applied` is the initial state. Recruiters move an application forward
/// (`shortlisted`, `interview`, `selected`) or reject it; the owning student
/// may withdraw it. `selected`, `rejected` and `withdrawn` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    Interview,
    Selected,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn parse(s: &str) -> Option<ApplicationStatus> {
        match s {
            "applied" => Some(ApplicationStatus::Applied),
            "shortlisted" => Some(ApplicationStatus::Shortlisted),
            "interview" => Some(ApplicationStatus::Interview),
            "selected" => Some(ApplicationStatus::Selected),
            "rejected" => Some(ApplicationStatus::Rejected),
            "withdrawn" => Some(ApplicationStatus::Withdrawn),
            _ => None,
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Selected
                | ApplicationStatus::Rejected
                | ApplicationStatus::Withdrawn
        )
    }

    /// Position in the recruiter pipeline, used to keep recruiter moves
    /// forward-only. Terminal states have no stage.
    fn stage(&self) -> Option<u8> {
        match self {
            ApplicationStatus::Applied => Some(0),
            ApplicationStatus::Shortlisted => Some(1),
            ApplicationStatus::Interview => Some(2),
            _ => None,
        }
    }

    /// Whether moving from `self` to `next` is a legal lifecycle move.
    ///
    /// - No transition leaves a terminal state.
    /// - Re-entering the current state is rejected; a transition into
    ///   `selected` therefore happens at most once per application, which is
    ///   what keeps the selected/hired counters from double-incrementing.
    /// - `rejected` and `withdrawn` are reachable from any non-terminal state.
    /// - Pipeline moves must go forward: applied -> shortlisted -> interview
    ///   -> selected, with stage-skipping allowed but never a step back.
    pub fn can_transition(&self, next: ApplicationStatus) -> bool {
        if self.is_terminal() || *self == next {
            return false;
        }
        match next {
            ApplicationStatus::Applied => false,
            ApplicationStatus::Rejected | ApplicationStatus::Withdrawn => true,
            ApplicationStatus::Selected => true,
            ApplicationStatus::Shortlisted | ApplicationStatus::Interview => {
                // stage() is Some for every non-terminal state
                match (self.stage(), next.stage()) {
                    (Some(cur), Some(nxt)) => nxt > cur,
                    _ => false,
                }
            }
        }
    }
}

/// A note appended to an application by a recruiter. Notes are append-only;
/// they are never edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub author_id: String,
    pub author_username: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Phone,
    Video,
    Onsite,
}

impl InterviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Phone => "phone",
            InterviewType::Video => "video",
            InterviewType::Onsite => "onsite",
        }
    }

    pub fn parse(s: &str) -> Option<InterviewType> {
        match s {
            "phone" => Some(InterviewType::Phone),
            "video" => Some(InterviewType::Video),
            "onsite" => Some(InterviewType::Onsite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSchedule {
    pub date: DateTime<Utc>,
    pub time: String,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    pub notes: Option<String>,
}

/// Feedback a recruiter leaves on an application. Rating is 1-5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub rating: u8,
    pub comments: Option<String>,
    pub given_by: String,
    pub given_at: DateTime<Utc>,
}

/// Resume snapshot carried on the application. The file itself lives in an
/// external store; only the reference is kept here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRef {
    pub url: String,
    pub filename: String,
}

/// Unique per (student, internship) pair; the uniqueness is enforced by the
/// storage layer. The recruiter reference is denormalized from the internship
/// at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub student_id: String,
    pub internship_id: String,
    pub recruiter_id: String,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub resume: Option<ResumeRef>,
    pub applied_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub notes: Vec<Note>,
    pub interview_schedule: Option<InterviewSchedule>,
    pub feedback: Option<Feedback>,
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;

    #[test]
    fn pipeline_moves_go_forward() {
        assert!(Applied.can_transition(Shortlisted));
        assert!(Applied.can_transition(Interview));
        assert!(Shortlisted.can_transition(Interview));
        assert!(Interview.can_transition(Selected));
        assert!(Applied.can_transition(Selected));
    }

    #[test]
    fn no_steps_back() {
        assert!(!Shortlisted.can_transition(Applied));
        assert!(!Interview.can_transition(Shortlisted));
        assert!(!Interview.can_transition(Applied));
    }

    #[test]
    fn rejected_reachable_from_any_nonterminal() {
        assert!(Applied.can_transition(Rejected));
        assert!(Shortlisted.can_transition(Rejected));
        assert!(Interview.can_transition(Rejected));
    }

    #[test]
    fn terminal_states_are_final() {
        for terminal in [Selected, Rejected, Withdrawn] {
            for next in [Applied, Shortlisted, Interview, Selected, Rejected, Withdrawn] {
                assert!(!terminal.can_transition(next));
            }
        }
    }

    #[test]
    fn reentering_current_state_is_rejected() {
        assert!(!Applied.can_transition(Applied));
        assert!(!Shortlisted.can_transition(Shortlisted));
        // the property behind "no double-select"
        assert!(!Selected.can_transition(Selected));
    }

    #[test]
    fn withdraw_allowed_from_any_nonterminal() {
        assert!(Applied.can_transition(Withdrawn));
        assert!(Shortlisted.can_transition(Withdrawn));
        assert!(Interview.can_transition(Withdrawn));
        assert!(!Selected.can_transition(Withdrawn));
    }
}
