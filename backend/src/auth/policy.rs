//! Role-based access policy.
//!
//! Every protected operation names an [`Action`]; the handler evaluates the
//! policy once at its top via [`authorize`] instead of sprinkling role
//! comparisons through the code. Ownership is the second half of the check
//! and stays in the storage queries: resource lookups are scoped to the
//! caller (`WHERE ... AND recruiter_id = ?`), and a miss is reported as
//! NotFound whether the resource is absent or merely out of scope.

use common::model::user::Role;

use super::AuthUser;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Student profile, skills and assessments.
    ManageStudentProfile,
    /// Submitting an application to a public internship.
    ApplyToInternship,
    /// Listing and withdrawing the student's own applications.
    ManageOwnApplications,
    /// Recruiter profile and internship postings.
    ManagePostings,
    /// Viewing applicants, changing application status, scheduling
    /// interviews, appending notes and feedback.
    TriageApplicants,
    /// Platform moderation and global analytics.
    Moderate,
}

impl Action {
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Action::ManageStudentProfile
            | Action::ApplyToInternship
            | Action::ManageOwnApplications => &[Role::Student],
            Action::ManagePostings | Action::TriageApplicants => &[Role::Recruiter],
            Action::Moderate => &[Role::Admin],
        }
    }
}

/// Role gate: 403 when the caller's role is not in the action's allowed set.
pub fn authorize(user: &AuthUser, action: Action) -> Result<(), ApiError> {
    if action.allowed_roles().contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "User role {} is not authorized to access this route",
            user.role.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            id: "u1".to_string(),
            username: "u1".to_string(),
            role,
            token: "t".to_string(),
        }
    }

    #[test]
    fn students_cannot_triage_or_moderate() {
        let student = user(Role::Student);
        assert!(authorize(&student, Action::ApplyToInternship).is_ok());
        assert!(authorize(&student, Action::TriageApplicants).is_err());
        assert!(authorize(&student, Action::Moderate).is_err());
    }

    #[test]
    fn recruiters_cannot_apply() {
        let recruiter = user(Role::Recruiter);
        assert!(authorize(&recruiter, Action::ManagePostings).is_ok());
        assert!(authorize(&recruiter, Action::ApplyToInternship).is_err());
    }

    #[test]
    fn admin_only_moderates() {
        let admin = user(Role::Admin);
        assert!(authorize(&admin, Action::Moderate).is_ok());
        assert!(authorize(&admin, Action::ManagePostings).is_err());
    }
}
